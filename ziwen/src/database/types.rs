use crate::ajo::Ajo;

/// A request record together with the revision it was read at.
/// Writing it back through [`super::Database::put_checked`] fails if
/// someone else wrote the record in between.
#[derive(Clone, Debug)]
pub struct Tracked {
    pub(super) ajo: Ajo,
    /// `None` for a record that isn't in the database yet.
    pub(super) revision: Option<i64>,
}

impl Tracked {
    /// Wrap a record that is not stored yet.
    #[must_use]
    pub fn new(ajo: Ajo) -> Tracked {
        Tracked {
            ajo,
            revision: None,
        }
    }
    #[must_use]
    pub fn ajo(&self) -> &Ajo {
        &self.ajo
    }
    pub fn ajo_mut(&mut self) -> &mut Ajo {
        &mut self.ajo
    }
    #[must_use]
    pub fn into_ajo(self) -> Ajo {
        self.ajo
    }
    #[must_use]
    pub fn revision(&self) -> Option<i64> {
        self.revision
    }
}

/// One line of the points ledger.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PointsEntry {
    /// `YYYY-MM`.
    pub month: String,
    pub comment_id: String,
    pub username: String,
    pub points: i64,
    pub post_id: String,
}
