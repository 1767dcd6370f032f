use k8s_openapi::api::networking::v1::Ingress;
use kube::ResourceExt as _;
use tracing::debug;

use crate::{
    error::{Error, Result},
    rules::{add_rule, hosts, remove_rule, HostRule},
    store::IngressStore,
};

/// An ingress fetched once, edited in memory and written back at most once.
///
/// The write is a plain replace. Unless conflict checking is turned on, the
/// resource version is dropped before writing, so a change another writer
/// made between our read and our write is silently overwritten. Note that
/// client-go's `Update` keeps the fetched version, so tools built on it get
/// a 409 on a stale write; here that behaviour is what `check_conflicts`
/// turns on.
pub struct RuleEditor<'a, S> {
    store: &'a S,
    namespace: String,
    ingress: Ingress,
    check_conflicts: bool,
}

impl<'a, S: IngressStore> RuleEditor<'a, S> {
    pub async fn fetch(store: &'a S, namespace: &str, name: &str) -> Result<Self> {
        let ingress = store
            .get(namespace, name)
            .await
            .map_err(|source| Error::Fetch {
                namespace: namespace.to_string(),
                name: name.to_string(),
                source,
            })?;

        debug!(
            "fetched ingress {namespace}/{name} at resource version {}, routing {:?}",
            ingress.resource_version().unwrap_or_default(),
            hosts(&ingress)
        );

        Ok(RuleEditor {
            store,
            namespace: namespace.to_string(),
            ingress,
            check_conflicts: false,
        })
    }

    /// Keep the fetched resource version on write, so the API server rejects
    /// the update if someone else changed the ingress in the meantime.
    pub fn check_conflicts(mut self, enabled: bool) -> Self {
        self.check_conflicts = enabled;
        self
    }

    /// Adds a rule for a host not yet present and persists the ingress.
    /// Returns `false` without writing anything if the host is already routed.
    pub async fn add(&mut self, rule: HostRule) -> Result<bool> {
        if !add_rule(&mut self.ingress, rule) {
            return Ok(false);
        }
        self.persist().await?;
        Ok(true)
    }

    /// Removes the rule for `host` and persists the ingress.
    /// Returns `false` without writing anything if no rule matches.
    pub async fn remove(&mut self, host: &str) -> Result<bool> {
        if !remove_rule(&mut self.ingress, host) {
            return Ok(false);
        }
        self.persist().await?;
        Ok(true)
    }

    async fn persist(&mut self) -> Result<()> {
        let name = self.ingress.name_any();

        let mut ingress = self.ingress.clone();
        if !self.check_conflicts {
            ingress.metadata.resource_version = None;
        }

        debug!("updating ingress {}/{name}", self.namespace);
        match self.store.update(&self.namespace, &ingress).await {
            Ok(updated) => {
                self.ingress = updated;
                Ok(())
            }
            Err(kube::Error::Api(response)) if response.code == 409 => Err(Error::Conflict {
                namespace: self.namespace.clone(),
                name,
                source: kube::Error::Api(response),
            }),
            Err(source) => Err(Error::Update {
                namespace: self.namespace.clone(),
                name,
                source,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use k8s_openapi::api::networking::v1::Ingress;

    use super::RuleEditor;
    use crate::{
        error::Error,
        rules::{add_rule, hosts, HostRule},
        store::fake::FakeStore,
    };

    const NAMESPACE: &str = "preview";

    fn preview_ingress(hosts: &[&str]) -> Ingress {
        let mut ingress: Ingress = serde_yaml::from_str(indoc::indoc! {r#"
            apiVersion: networking.k8s.io/v1
            kind: Ingress
            metadata:
              name: previews
              annotations:
                kubernetes.io/ingress.class: gce
              labels:
                app: previews
            spec:
              tls:
                - secretName: previews-tls
              rules: []
        "#})
        .unwrap();

        for host in hosts {
            add_rule(&mut ingress, HostRule::new(*host, "svc", 80));
        }
        ingress
    }

    #[tokio::test]
    async fn add_persists_once() {
        let store = FakeStore::with(NAMESPACE, preview_ingress(&[]));

        let mut editor = RuleEditor::fetch(&store, NAMESPACE, "previews")
            .await
            .unwrap();
        let added = editor
            .add(HostRule::new("foo.example.com", "svc1", 80))
            .await
            .unwrap();

        assert!(added);
        assert_eq!(store.gets.get(), 1);
        assert_eq!(store.updates.get(), 1);

        let stored = store.stored(NAMESPACE, "previews").unwrap();
        assert_eq!(hosts(&stored), ["foo.example.com"]);
    }

    #[tokio::test]
    async fn write_back_preserves_unrelated_fields() {
        let store = FakeStore::with(NAMESPACE, preview_ingress(&["a.example.com"]));
        let before = store.stored(NAMESPACE, "previews").unwrap();

        let mut editor = RuleEditor::fetch(&store, NAMESPACE, "previews")
            .await
            .unwrap();
        editor
            .add(HostRule::new("b.example.com", "svc", 80))
            .await
            .unwrap();

        let after = store.stored(NAMESPACE, "previews").unwrap();
        assert_eq!(after.metadata.annotations, before.metadata.annotations);
        assert_eq!(after.metadata.labels, before.metadata.labels);
        assert_eq!(
            after.spec.as_ref().unwrap().tls,
            before.spec.as_ref().unwrap().tls
        );
        assert_eq!(hosts(&after), ["a.example.com", "b.example.com"]);
    }

    #[tokio::test]
    async fn no_op_does_not_write() {
        let store = FakeStore::with(NAMESPACE, preview_ingress(&["foo.example.com"]));

        let mut editor = RuleEditor::fetch(&store, NAMESPACE, "previews")
            .await
            .unwrap();

        assert!(!editor
            .add(HostRule::new("foo.example.com", "svc2", 81))
            .await
            .unwrap());
        assert!(!editor.remove("absent.example.com").await.unwrap());
        assert_eq!(store.updates.get(), 0);
    }

    #[tokio::test]
    async fn remove_persists() {
        let store = FakeStore::with(NAMESPACE, preview_ingress(&["bar.example.com"]));

        let mut editor = RuleEditor::fetch(&store, NAMESPACE, "previews")
            .await
            .unwrap();

        assert!(editor.remove("bar.example.com").await.unwrap());
        assert!(hosts(&store.stored(NAMESPACE, "previews").unwrap()).is_empty());
    }

    #[tokio::test]
    async fn missing_ingress_is_a_fetch_error() {
        let store = FakeStore::with(NAMESPACE, preview_ingress(&[]));

        let result = RuleEditor::fetch(&store, NAMESPACE, "nope").await;
        assert!(matches!(result, Err(Error::Fetch { .. })));

        let result = RuleEditor::fetch(&store, "elsewhere", "previews").await;
        assert!(matches!(result, Err(Error::Fetch { .. })));
    }

    #[tokio::test]
    async fn failed_update_is_an_update_error() {
        let store = FakeStore::with(NAMESPACE, preview_ingress(&[]));
        store.fail_updates.set(true);

        let mut editor = RuleEditor::fetch(&store, NAMESPACE, "previews")
            .await
            .unwrap();
        let result = editor.add(HostRule::new("foo.example.com", "svc", 80)).await;

        assert!(matches!(result, Err(Error::Update { .. })));
        assert!(hosts(&store.stored(NAMESPACE, "previews").unwrap()).is_empty());
    }

    /// Two runs racing on the same ingress: the second write replaces the
    /// first one wholesale, and the first host is lost.
    #[tokio::test]
    async fn concurrent_edits_lose_updates_by_default() {
        let store = FakeStore::with(NAMESPACE, preview_ingress(&[]));

        let mut first = RuleEditor::fetch(&store, NAMESPACE, "previews")
            .await
            .unwrap();
        let mut second = RuleEditor::fetch(&store, NAMESPACE, "previews")
            .await
            .unwrap();

        assert!(first
            .add(HostRule::new("pr-1.example.com", "pr-1", 80))
            .await
            .unwrap());
        assert!(second
            .add(HostRule::new("pr-2.example.com", "pr-2", 80))
            .await
            .unwrap());

        let stored = store.stored(NAMESPACE, "previews").unwrap();
        assert_eq!(hosts(&stored), ["pr-2.example.com"]);
    }

    #[tokio::test]
    async fn conflict_checking_rejects_stale_writes() {
        let store = FakeStore::with(NAMESPACE, preview_ingress(&[]));

        let mut first = RuleEditor::fetch(&store, NAMESPACE, "previews")
            .await
            .unwrap()
            .check_conflicts(true);
        let mut second = RuleEditor::fetch(&store, NAMESPACE, "previews")
            .await
            .unwrap()
            .check_conflicts(true);

        first
            .add(HostRule::new("pr-1.example.com", "pr-1", 80))
            .await
            .unwrap();
        let result = second
            .add(HostRule::new("pr-2.example.com", "pr-2", 80))
            .await;

        assert!(matches!(result, Err(Error::Conflict { .. })));

        let stored = store.stored(NAMESPACE, "previews").unwrap();
        assert_eq!(hosts(&stored), ["pr-1.example.com"]);
    }
}
