mod feature;
mod notice;
pub(crate) mod place;
pub(crate) mod submission;

pub use feature::{icon_for, label_for, Feature};
pub use notice::{Notice, NoticeKind, SUCCESS_DISMISS_SECS};
pub use place::{Counter, Persistence, Place, PlaceType};
pub use submission::{NewPlace, Submission, REQUIRED_FIELDS_MESSAGE};
