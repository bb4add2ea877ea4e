//! Allow/deny decisions and their API Gateway policy rendering.

use serde::Serialize;

pub const POLICY_VERSION: &str = "2012-10-17";
pub const INVOKE_ACTION: &str = "execute-api:Invoke";
pub const ALL_RESOURCES: &str = "*";
/// Principal reported for every denied request; never derived from the token.
pub const ANONYMOUS_PRINCIPAL: &str = "user";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Effect {
    Allow,
    Deny,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthDecision {
    pub principal_id: String,
    pub effect: Effect,
    pub resource: String,
}

impl AuthDecision {
    pub fn allow(principal_id: impl Into<String>) -> Self {
        Self {
            principal_id: principal_id.into(),
            effect: Effect::Allow,
            resource: ALL_RESOURCES.to_string(),
        }
    }

    pub fn deny() -> Self {
        Self {
            principal_id: ANONYMOUS_PRINCIPAL.to_string(),
            effect: Effect::Deny,
            resource: ALL_RESOURCES.to_string(),
        }
    }

    pub fn is_allowed(&self) -> bool {
        self.effect == Effect::Allow
    }

    pub fn to_policy_response(&self) -> AuthorizerResponse {
        AuthorizerResponse {
            principal_id: self.principal_id.clone(),
            policy_document: PolicyDocument {
                version: POLICY_VERSION.to_string(),
                statement: vec![Statement {
                    action: INVOKE_ACTION.to_string(),
                    effect: self.effect,
                    resource: self.resource.clone(),
                }],
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizerResponse {
    pub principal_id: String,
    pub policy_document: PolicyDocument,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    pub version: String,
    pub statement: Vec<Statement>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Statement {
    pub action: String,
    pub effect: Effect,
    pub resource: String,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn allow_renders_gateway_policy() {
        let body = serde_json::to_value(AuthDecision::allow("user123").to_policy_response())
            .unwrap();

        assert_eq!(
            body,
            json!({
                "principalId": "user123",
                "policyDocument": {
                    "Version": "2012-10-17",
                    "Statement": [{
                        "Action": "execute-api:Invoke",
                        "Effect": "Allow",
                        "Resource": "*"
                    }]
                }
            })
        );
    }

    #[test]
    fn deny_uses_placeholder_principal() {
        let decision = AuthDecision::deny();
        assert_eq!(decision.principal_id, "user");
        assert!(!decision.is_allowed());

        let body = serde_json::to_value(decision.to_policy_response()).unwrap();
        assert_eq!(body["policyDocument"]["Statement"][0]["Effect"], "Deny");
        assert_eq!(body["policyDocument"]["Statement"][0]["Resource"], "*");
    }
}
