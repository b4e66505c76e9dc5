pub mod use_cases;

pub use use_cases::{
    authenticate::{AuthenticateError, AuthenticateUseCase, AuthenticatedSession},
    register::{RegisterError, RegisterUseCase},
};
