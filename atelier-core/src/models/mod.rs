//! Domain models shared by the server and the CLI
//!
//! Each model belongs to exactly one schema. References that cross a schema
//! boundary are plain ids (no database-level foreign key).

pub mod blog;
pub mod blueprint;
pub mod support;
pub mod user;
pub mod validation;

pub use blog::{BlogPost, PostWithAuthor};
pub use blueprint::{Blueprint, BlueprintDraft, BlueprintFilter, BlueprintWithOwner, Tier, Visibility};
pub use support::SupportTag;
pub use user::{MeResponse, Plan, PublicProfile, Subscription, SubscriptionStatus, UserProfile};
pub use validation::ValidationError;
