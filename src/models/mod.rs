//! Irrigation planning domain models.
//!
//! Provides the input zone records and the two-view schedule produced by
//! a planning run.
//!
//! # Domain Mappings
//!
//! | sprinkler-plan | Irrigation controller |
//! |----------------|-----------------------|
//! | Zone | Station / line |
//! | Slot | Program start time within a day |
//! | Schedule | Set of interval-day programs |

mod schedule;
mod zone;

pub use schedule::{Schedule, SlotRef, Violation, ViolationType};
pub use zone::{Zone, ZoneGroup};
