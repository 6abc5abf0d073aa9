pub mod appointment;
pub mod job;
pub mod mechanic;
pub mod shop;
pub mod shop_invitation;
pub mod shop_user;
pub mod user;
pub mod waitlist;

pub use appointment::{Appointment, AppointmentStatus};
pub use job::{Job, JobStatus};
pub use mechanic::Mechanic;
pub use shop::{Shop, ShopAddress};
pub use shop_invitation::{InvitationStatus, ShopInvitation};
pub use shop_user::{MemberRole, ShopUser};
pub use user::{User, UserRole};
pub use waitlist::WaitlistEntry;
