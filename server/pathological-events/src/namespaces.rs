//! Built-in namespace universe: the platform namespaces that always get a
//! result, plus the empty namespace for everything else.

pub const PLATFORM_NAMESPACES: &[&str] = &[
  "default",
  "kube-system",
  "openshift",
  "openshift-apiserver",
  "openshift-apiserver-operator",
  "openshift-authentication",
  "openshift-authentication-operator",
  "openshift-cloud-controller-manager",
  "openshift-cloud-controller-manager-operator",
  "openshift-cloud-credential-operator",
  "openshift-cluster-csi-drivers",
  "openshift-cluster-machine-approver",
  "openshift-cluster-node-tuning-operator",
  "openshift-cluster-samples-operator",
  "openshift-cluster-storage-operator",
  "openshift-cluster-version",
  "openshift-config-operator",
  "openshift-console",
  "openshift-console-operator",
  "openshift-controller-manager",
  "openshift-controller-manager-operator",
  "openshift-dns",
  "openshift-dns-operator",
  "openshift-etcd",
  "openshift-etcd-operator",
  "openshift-image-registry",
  "openshift-ingress",
  "openshift-ingress-canary",
  "openshift-ingress-operator",
  "openshift-insights",
  "openshift-kube-apiserver",
  "openshift-kube-apiserver-operator",
  "openshift-kube-controller-manager",
  "openshift-kube-controller-manager-operator",
  "openshift-kube-scheduler",
  "openshift-kube-scheduler-operator",
  "openshift-kube-storage-version-migrator",
  "openshift-kube-storage-version-migrator-operator",
  "openshift-machine-api",
  "openshift-machine-config-operator",
  "openshift-marketplace",
  "openshift-monitoring",
  "openshift-multus",
  "openshift-network-diagnostics",
  "openshift-network-operator",
  "openshift-oauth-apiserver",
  "openshift-operator-lifecycle-manager",
  "openshift-ovn-kubernetes",
  "openshift-sdn",
  "openshift-service-ca",
  "openshift-service-ca-operator",
];

pub fn known_namespaces() -> Vec<String> {
  PLATFORM_NAMESPACES.iter().map(|ns| ns.to_string()).collect()
}

/// Sorted, deduplicated universe that always includes `""`.
pub fn universe(known: &[String]) -> Vec<String> {
  let mut all: Vec<String> = known.to_vec();
  all.push(String::new());
  all.sort();
  all.dedup();
  all
}
