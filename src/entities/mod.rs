pub mod check_ins;
pub mod client_memberships;
pub mod clients;
pub mod membership_plans;
pub mod payments;
pub mod staff_users;
pub mod trainers;

pub use check_ins as check_in_entity;
pub use client_memberships as client_membership_entity;
pub use clients as client_entity;
pub use membership_plans as membership_plan_entity;
pub use payments as payment_entity;
pub use staff_users as staff_user_entity;
pub use trainers as trainer_entity;

pub use client_memberships::MembershipStatus;
pub use clients::Gender;
pub use membership_plans::PlanKind;
pub use payments::PaymentMethod;
