//! Errors raised while building or ticking a scene.

/// Scene construction and synchronization failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SceneError {
    /// A physics primitive was not available when the scene was built.
    #[error("{primitive} is not available; scene construction aborted")]
    MissingDependency { primitive: &'static str },

    /// The particle buffer and the proxy arena disagree on the particle count.
    #[error("particle buffer holds {buffer} particles but {proxies} proxies are bound")]
    IndexMismatch { buffer: usize, proxies: usize },

    /// A position buffer with a dangling coordinate.
    #[error("position buffer length {len} is not a whole number of (x, y) pairs")]
    MalformedBuffer { len: usize },

    #[error("scene is already running")]
    AlreadyRunning,

    #[error("scene has not been initialized")]
    NotRunning,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_problem() {
        let err = SceneError::MissingDependency {
            primitive: "PhysicsWorld",
        };
        assert!(err.to_string().starts_with("PhysicsWorld"));

        let err = SceneError::IndexMismatch {
            buffer: 10,
            proxies: 12,
        };
        assert_eq!(
            err.to_string(),
            "particle buffer holds 10 particles but 12 proxies are bound"
        );
    }
}
