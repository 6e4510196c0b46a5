use crate::error::registry::RegistryError;

use common::ErrorLocation;
use models::face::FACE_COUNT;
use models::{FaceCells, FaceId, FaceRecord};

use std::panic::Location;

use log::debug;

/// The six face records, one slot per [`FaceId`].
///
/// Slots are fixed: detection overwrites in place, so a face can never be
/// recorded twice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CubeFaceRegistry {
    records: [FaceRecord; FACE_COUNT],
}

impl CubeFaceRegistry {
    pub fn new() -> Self {
        Self {
            records: FaceId::ALL.map(FaceRecord::placeholder),
        }
    }

    pub fn upsert(&mut self, face: FaceId, cells: FaceCells, confirmed: bool) -> &FaceRecord {
        let record = &mut self.records[face.index()];
        record.cells = cells;
        record.confirmed = confirmed;
        debug!("Face {face} updated: {cells} (confirmed={confirmed})");
        record
    }

    #[track_caller]
    pub fn confirm(&mut self, face: FaceId) -> Result<&FaceRecord, RegistryError> {
        let record = &mut self.records[face.index()];

        if !record.is_detected() {
            return Err(RegistryError::NotFound {
                face,
                location: ErrorLocation::from(Location::caller()),
            });
        }

        record.confirmed = true;
        Ok(record)
    }

    pub fn rescan(&mut self, face: FaceId) {
        self.records[face.index()] = FaceRecord::placeholder(face);
        debug!("Face {face} cleared for rescan");
    }

    pub fn reset(&mut self) {
        self.records = FaceId::ALL.map(FaceRecord::placeholder);
    }

    pub fn get(&self, face: FaceId) -> &FaceRecord {
        &self.records[face.index()]
    }

    /// Records in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = &FaceRecord> {
        self.records.iter()
    }

    /// True until any face has been detected. All six slots always exist.
    pub fn none_detected(&self) -> bool {
        self.detected_count() == 0
    }

    pub fn detected_count(&self) -> usize {
        self.records.iter().filter(|record| record.is_detected()).count()
    }

    pub fn confirmed_count(&self) -> usize {
        self.records.iter().filter(|record| record.confirmed).count()
    }

    pub fn all_confirmed(&self) -> bool {
        self.confirmed_count() == FACE_COUNT
    }
}

impl Default for CubeFaceRegistry {
    fn default() -> Self {
        Self::new()
    }
}
