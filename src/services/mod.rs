// Business logic layer, one service per resource

pub mod accounting;
pub mod body_composition;
pub mod class_registration;
pub mod client;
pub mod indicators;
pub mod jwt;
pub mod payment;
pub mod product;
pub mod routine;
pub mod session;
pub mod trainer;
pub mod user;

// Re-export commonly used services
pub use accounting::AccountingService;
pub use body_composition::BodyCompositionService;
pub use class_registration::ClassService;
pub use client::ClientService;
pub use indicators::IndicatorService;
pub use jwt::{JwtConfig, JwtError, JwtService};
pub use payment::PaymentService;
pub use product::ProductService;
pub use routine::RoutineService;
pub use session::SessionService;
pub use trainer::TrainerService;
pub use user::UserService;
