pub mod settings;

pub use settings::{
    AllowedOrigins, ApplicationSettings, DirectorySettings, IdentitySettings, Settings,
};
