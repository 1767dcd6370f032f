use k8s_openapi::api::networking::v1::Ingress;
use kube::{
    api::{Api, PostParams},
    Client, ResourceExt as _,
};

/// The two calls the rule editor needs from the cluster.
#[allow(async_fn_in_trait)]
pub trait IngressStore {
    async fn get(&self, namespace: &str, name: &str) -> Result<Ingress, kube::Error>;

    /// Replaces the whole object. The server only checks for concurrent
    /// modification when `metadata.resourceVersion` is set.
    async fn update(&self, namespace: &str, ingress: &Ingress) -> Result<Ingress, kube::Error>;
}

impl IngressStore for Client {
    async fn get(&self, namespace: &str, name: &str) -> Result<Ingress, kube::Error> {
        Api::<Ingress>::namespaced(self.clone(), namespace)
            .get(name)
            .await
    }

    async fn update(&self, namespace: &str, ingress: &Ingress) -> Result<Ingress, kube::Error> {
        Api::<Ingress>::namespaced(self.clone(), namespace)
            .replace(&ingress.name_any(), &PostParams::default(), ingress)
            .await
    }
}

impl<T: IngressStore> IngressStore for &T {
    async fn get(&self, namespace: &str, name: &str) -> Result<Ingress, kube::Error> {
        (**self).get(namespace, name).await
    }

    async fn update(&self, namespace: &str, ingress: &Ingress) -> Result<Ingress, kube::Error> {
        (**self).update(namespace, ingress).await
    }
}
