use std::collections::HashMap;

/// ParamBindings
///
/// Parameter values captured by the matching route, keyed by the name used in
/// the pattern (`:id` binds `id`). Values are the raw request segments, never
/// percent-decoded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamBindings(HashMap<String, String>);

impl ParamBindings {
    pub(crate) fn bind(&mut self, name: &str, value: &str) {
        self.0.insert(name.to_string(), value.to_string());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Identity
///
/// The verified caller, as established by [`crate::auth::AuthGate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub username: String,
}

/// RequestScope
///
/// Per-request values handed explicitly to every handler: the parameters bound
/// by the router and, behind an `AuthGate`, the caller's identity. Built once
/// at dispatch and owned by the task handling the request.
#[derive(Debug, Default)]
pub struct RequestScope {
    params: ParamBindings,
    identity: Option<Identity>,
}

impl RequestScope {
    pub fn new(params: ParamBindings) -> Self {
        Self {
            params,
            identity: None,
        }
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name)
    }

    /// `None` unless the request passed through an `AuthGate`.
    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    // Write-once: a second gate on the same request keeps the first identity.
    pub(crate) fn admit(&mut self, identity: Identity) {
        self.identity.get_or_insert(identity);
    }
}
