use serde::Serialize;

use super::directory::Directory;
use super::geo::GeoLocation;
use super::kind::DirectoryKind;

/// All directories produced by one decode, in discovery order.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Metadata {
    directories: Vec<Directory>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a directory, returning its position.
    pub fn push(&mut self, directory: Directory) -> usize {
        self.directories.push(directory);
        self.directories.len() - 1
    }

    /// Append every directory of `other`, keeping its order.
    pub fn extend(&mut self, other: Metadata) {
        self.directories.extend(other.directories);
    }

    pub fn len(&self) -> usize {
        self.directories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directories.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Directory> {
        self.directories.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Directory> {
        self.directories.get_mut(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Directory> {
        self.directories.iter()
    }

    pub fn directories(&self) -> &[Directory] {
        &self.directories
    }

    /// Directories of one kind, in discovery order.
    pub fn of_kind(&self, kind: DirectoryKind) -> impl Iterator<Item = &Directory> {
        self.directories.iter().filter(move |d| d.kind() == kind)
    }

    pub fn first_of(&self, kind: DirectoryKind) -> Option<&Directory> {
        self.of_kind(kind).next()
    }

    pub fn position_of(&self, kind: DirectoryKind) -> Option<usize> {
        self.directories.iter().position(|d| d.kind() == kind)
    }

    pub fn contains(&self, kind: DirectoryKind) -> bool {
        self.position_of(kind).is_some()
    }

    pub fn has_errors(&self) -> bool {
        self.directories.iter().any(Directory::has_errors)
    }

    /// Every recorded error with the kind of directory it belongs to.
    pub fn errors(&self) -> impl Iterator<Item = (DirectoryKind, &str)> {
        self.directories
            .iter()
            .flat_map(|d| d.errors().iter().map(move |e| (d.kind(), e.as_str())))
    }

    /// Position from the first GPS directory that carries one.
    pub fn geo_location(&self) -> Option<GeoLocation> {
        self.of_kind(DirectoryKind::Gps)
            .find_map(GeoLocation::from_gps_directory)
    }
}

impl<'a> IntoIterator for &'a Metadata {
    type Item = &'a Directory;
    type IntoIter = std::slice::Iter<'a, Directory>;

    fn into_iter(self) -> Self::IntoIter {
        self.directories.iter()
    }
}

impl IntoIterator for Metadata {
    type Item = Directory;
    type IntoIter = std::vec::IntoIter<Directory>;

    fn into_iter(self) -> Self::IntoIter {
        self.directories.into_iter()
    }
}
