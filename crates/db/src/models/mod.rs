pub mod analytics;
pub mod creator_profile;
pub mod episode;
pub mod otp;
pub mod refresh_token;
pub mod series;
pub mod user;
