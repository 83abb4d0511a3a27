use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: String,
    pub email: Option<String>,
    pub full_name: Option<String>,
}

impl SessionUser {
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or(&self.id)
    }
}

/// Yields the authenticated caller, if any.
pub trait SessionProvider {
    fn current_user(&self) -> Option<SessionUser>;
}

/// Identity asserted by the host shell for this sidecar instance.
#[derive(Debug, Default)]
pub struct Session {
    user: Option<SessionUser>,
}

impl Session {
    pub fn sign_in(&mut self, user: SessionUser) {
        self.user = Some(user);
    }

    pub fn sign_out(&mut self) -> Option<SessionUser> {
        self.user.take()
    }
}

impl SessionProvider for Session {
    fn current_user(&self) -> Option<SessionUser> {
        self.user.clone()
    }
}
