//! Entity trait and shared audit fields.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_object::ValueObject;

/// Entity marker + minimal interface.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}

/// Creation/modification timestamps embedded in every persisted entity.
///
/// The stamps are owned by the persistence collaborator: repositories call
/// [`AuditStamp::touch`] on save, and the engines never write these fields.
/// Both are `None` until the entity has been saved once.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStamp {
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl AuditStamp {
    /// Record a save at `now`: sets `created_at` on the first call only and
    /// advances `updated_at` on every call.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.created_at.get_or_insert(now);
        self.updated_at = Some(now);
    }
}

impl ValueObject for AuditStamp {}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn touch_sets_created_at_once_and_advances_updated_at() {
        let t1 = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();
        let t2 = Utc.with_ymd_and_hms(2025, 3, 2, 9, 0, 0).unwrap();

        let mut stamp = AuditStamp::default();
        assert_eq!(stamp.created_at, None);
        assert_eq!(stamp.updated_at, None);

        stamp.touch(t1);
        assert_eq!(stamp.created_at, Some(t1));
        assert_eq!(stamp.updated_at, Some(t1));

        stamp.touch(t2);
        assert_eq!(stamp.created_at, Some(t1));
        assert_eq!(stamp.updated_at, Some(t2));
    }
}
