//! sqlx repositories. Each is a zero-sized struct whose methods take a
//! `&PgPool` and return raw `sqlx::Error`s.

pub mod creator_profile_repo;
pub mod episode_repo;
pub mod otp_repo;
pub mod refresh_token_repo;
pub mod series_repo;
pub mod user_repo;

pub use creator_profile_repo::CreatorProfileRepo;
pub use episode_repo::EpisodeRepo;
pub use otp_repo::OtpRepo;
pub use refresh_token_repo::RefreshTokenRepo;
pub use series_repo::SeriesRepo;
pub use user_repo::UserRepo;
