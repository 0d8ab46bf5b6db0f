use std::sync::Mutex;

use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
}

#[derive(Default)]
struct Inner {
    user: Option<UserProfile>,
    token: Option<String>,
    listeners: Vec<Box<dyn Fn(Option<&UserProfile>) + Send>>,
}

/// Explicit session handle, constructed once and passed to every component
/// that needs the current user or token. Components that want to react to
/// login and logout register a listener instead of re-reading global state.
#[derive(Default)]
pub struct SessionContext {
    inner: Mutex<Inner>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_user(&self) -> Option<UserProfile> {
        self.inner.lock().unwrap().user.clone()
    }

    pub fn bearer_token(&self) -> Option<String> {
        self.inner.lock().unwrap().token.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.lock().unwrap().token.is_some()
    }

    pub fn set_session(&self, user: UserProfile, token: String) {
        let mut inner = self.inner.lock().unwrap();
        inner.user = Some(user);
        inner.token = Some(token);
        let user = inner.user.clone();
        for listener in &inner.listeners {
            listener(user.as_ref());
        }
    }

    pub fn clear(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.user = None;
        inner.token = None;
        for listener in &inner.listeners {
            listener(None);
        }
    }

    pub fn on_session_change(&self, listener: impl Fn(Option<&UserProfile>) + Send + 'static) {
        self.inner.lock().unwrap().listeners.push(Box::new(listener));
    }
}
