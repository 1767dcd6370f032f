use k8s_openapi::api::networking::v1::{
    HTTPIngressPath, HTTPIngressRuleValue, Ingress, IngressBackend, IngressRule,
    IngressServiceBackend, IngressSpec, ServiceBackendPort,
};

pub const DEFAULT_PATH: &str = "/*";
pub const DEFAULT_PATH_TYPE: &str = "ImplementationSpecific";

/// A single host routed to a service port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostRule {
    pub host: String,
    pub path: String,
    pub path_type: String,
    pub service: String,
    pub port: i32,
}

impl HostRule {
    pub fn new(host: impl Into<String>, service: impl Into<String>, port: i32) -> Self {
        HostRule {
            host: host.into(),
            path: DEFAULT_PATH.to_string(),
            path_type: DEFAULT_PATH_TYPE.to_string(),
            service: service.into(),
            port,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn with_path_type(mut self, path_type: impl Into<String>) -> Self {
        self.path_type = path_type.into();
        self
    }
}

impl From<HostRule> for IngressRule {
    fn from(rule: HostRule) -> Self {
        IngressRule {
            host: Some(rule.host),
            http: Some(HTTPIngressRuleValue {
                paths: vec![HTTPIngressPath {
                    path: Some(rule.path),
                    path_type: rule.path_type,
                    backend: IngressBackend {
                        service: Some(IngressServiceBackend {
                            name: rule.service,
                            port: Some(ServiceBackendPort {
                                number: Some(rule.port),
                                ..ServiceBackendPort::default()
                            }),
                        }),
                        ..IngressBackend::default()
                    },
                }],
            }),
        }
    }
}

/// Appends `rule` unless a rule for the same host already exists.
///
/// An existing rule is never touched, whatever service or port it points at.
/// Returns whether the rule was added.
pub fn add_rule(ingress: &mut Ingress, rule: HostRule) -> bool {
    let rules = ingress
        .spec
        .get_or_insert_with(IngressSpec::default)
        .rules
        .get_or_insert_with(Vec::new);

    if rules
        .iter()
        .any(|existing| existing.host.as_deref() == Some(rule.host.as_str()))
    {
        return false;
    }

    rules.push(rule.into());
    true
}

/// Removes the first rule for `host`, keeping the remaining rules in order.
/// Returns whether a rule was found.
pub fn remove_rule(ingress: &mut Ingress, host: &str) -> bool {
    let Some(rules) = ingress
        .spec
        .as_mut()
        .and_then(|spec| spec.rules.as_mut())
    else {
        return false;
    };

    match rules
        .iter()
        .position(|rule| rule.host.as_deref() == Some(host))
    {
        Some(index) => {
            rules.remove(index);
            true
        }
        None => false,
    }
}

/// Hosts of the ingress' rules, in order. Rules without a host are skipped.
pub fn hosts(ingress: &Ingress) -> Vec<&str> {
    ingress
        .spec
        .iter()
        .flat_map(|spec| spec.rules.iter().flatten())
        .filter_map(|rule| rule.host.as_deref())
        .collect()
}
