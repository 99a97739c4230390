/// Errors returned by the single-object localizers.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LocalizeError {
    #[error("no region found for marker profile `{profile}`")]
    NoRegion { profile: String },
    #[error("no target found")]
    NoTarget,
}
