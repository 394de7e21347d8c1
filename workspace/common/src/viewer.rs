/// Identity of whoever makes the current request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Viewer {
    #[default]
    Anonymous,
    User(i32),
}

impl Viewer {
    pub fn is_anonymous(&self) -> bool {
        matches!(self, Viewer::Anonymous)
    }

    pub fn user_id(&self) -> Option<i32> {
        match self {
            Viewer::Anonymous => None,
            Viewer::User(id) => Some(*id),
        }
    }

    /// True when the viewer is the authenticated user `user_id`.
    /// An anonymous viewer is nobody.
    pub fn is(&self, user_id: i32) -> bool {
        self.user_id() == Some(user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymous_is_nobody() {
        let viewer = Viewer::Anonymous;
        assert!(viewer.is_anonymous());
        assert_eq!(viewer.user_id(), None);
        assert!(!viewer.is(0));
        assert!(!viewer.is(1));
    }

    #[test]
    fn test_user_matches_only_itself() {
        let viewer = Viewer::User(7);
        assert!(!viewer.is_anonymous());
        assert_eq!(viewer.user_id(), Some(7));
        assert!(viewer.is(7));
        assert!(!viewer.is(8));
    }
}
