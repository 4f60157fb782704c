pub mod chapter;
pub mod invitation;
pub mod invitation_usage;
pub mod member;
pub mod system_setting;

#[allow(unused_imports)]
pub mod prelude {
    pub use super::chapter::{self, Entity as Chapter};
    pub use super::invitation::{self, Entity as Invitation};
    pub use super::invitation_usage::{self, Entity as InvitationUsage};
    pub use super::member::{self, Entity as Member};
    pub use super::system_setting::{self, Entity as SystemSetting};
}
