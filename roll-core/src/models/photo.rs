//! Camera-roll document model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::UserId;

/// A geographic coordinate attached to a photo, when the device recorded one.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// One uploaded photo: the blob-store URL plus capture metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PhotoRecord {
    /// Download URL returned by the object store
    pub url: String,

    /// When the photo was taken
    pub taken_at: DateTime<Utc>,

    /// Capture location, if available
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
}

/// Per-user camera-roll document.
///
/// `earliest_at`/`latest_at` bracket the capture times of everything uploaded
/// so far; appending a record widens them in the same document write.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CameraRoll {
    /// Owner of the camera roll
    pub user_id: UserId,

    /// Uploaded photos in upload order
    #[serde(default)]
    pub photos: Vec<PhotoRecord>,

    /// Earliest capture timestamp seen so far
    pub earliest_at: Option<DateTime<Utc>>,

    /// Latest capture timestamp seen so far
    pub latest_at: Option<DateTime<Utc>>,
}

impl CameraRoll {
    /// Create an empty camera roll for `user_id`.
    pub fn new(user_id: impl Into<UserId>) -> Self {
        Self {
            user_id: user_id.into(),
            photos: Vec::new(),
            earliest_at: None,
            latest_at: None,
        }
    }

    /// Append a record, widening the timestamp bounds.
    pub fn append(&mut self, record: PhotoRecord) {
        match self.earliest_at {
            Some(earliest) if earliest <= record.taken_at => {}
            _ => self.earliest_at = Some(record.taken_at),
        }
        match self.latest_at {
            Some(latest) if latest >= record.taken_at => {}
            _ => self.latest_at = Some(record.taken_at),
        }
        self.photos.push(record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn append_widens_timestamp_bounds() {
        let mut roll = CameraRoll::new("u1");
        let early = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2023, 6, 1, 0, 0, 0).unwrap();
        let middle = Utc.with_ymd_and_hms(2023, 3, 1, 0, 0, 0).unwrap();

        for taken_at in [middle, late, early] {
            roll.append(PhotoRecord {
                url: "https://example.com/p.jpg".to_string(),
                taken_at,
                location: None,
            });
        }

        assert_eq!(roll.earliest_at, Some(early));
        assert_eq!(roll.latest_at, Some(late));
        assert_eq!(roll.photos.len(), 3);
    }
}
