//! Built-in allow-list. Order matters: narrower matchers come before broader
//! ones that would otherwise shadow them.

use crate::matcher::MatcherSpec;
use crate::types::{PlatformType, TopologyMode};

pub const PROBE_ERROR_LIVENESS: &str = "ProbeErrorLiveness";
pub const PROBE_ERROR_TIMEOUT_AWAITING_HEADERS: &str = "ProbeErrorTimeoutAwaitingHeaders";
pub const PROBE_ERROR_CONNECTION_REFUSED: &str = "ProbeErrorConnectionRefused";

pub fn probe_error_liveness() -> MatcherSpec {
  MatcherSpec::named(PROBE_ERROR_LIVENESS)
    .namespace_regex(r"^openshift-")
    .reason_exact("ProbeError")
    .human_regex(r"Liveness probe error.*Client\.Timeout exceeded while awaiting headers")
}

pub fn probe_error_timeout_awaiting_headers() -> MatcherSpec {
  MatcherSpec::named(PROBE_ERROR_TIMEOUT_AWAITING_HEADERS)
    .namespace_regex(r"^openshift-")
    .reason_exact("ProbeError")
    .human_regex(r"Client\.Timeout exceeded while awaiting headers")
}

pub fn probe_error_connection_refused() -> MatcherSpec {
  MatcherSpec::named(PROBE_ERROR_CONNECTION_REFUSED)
    .namespace_regex(r"^openshift-")
    .reason_exact("ProbeError")
    .human_regex(r"Readiness probe error:.*connection refused")
}

/// Repeated events that are expected and do not indicate a regression.
pub fn allowed_repeated_events() -> Vec<MatcherSpec> {
  vec![
    // Port-forwarding tests reuse the pod name with a tight readiness check.
    MatcherSpec::named("UnhealthyE2EPortForwarding")
      .namespace_regex(r"^e2e-port-forwarding-[0-9]+$")
      .pod_regex(r"^pfpod$")
      .reason_exact("Unhealthy")
      .human_regex(r"^Readiness probe failed: "),
    MatcherSpec::named("KubeletUnhealthyReadinessProbeFailed")
      .namespace_regex(r"^e2e-port-forwarding-[0-9]+$")
      .pod_regex(r"^pfpod$")
      .reason_exact("Unhealthy")
      .human_regex(r"^Readiness probe failed"),
    // StatefulSet tests pause new pods by failing readiness on purpose.
    MatcherSpec::named("UnhealthyStatefulSetPod")
      .namespace_regex(r"^e2e-statefulset-[0-9]+$")
      .pod_regex(r"^ss-[0-9]+$")
      .reason_exact("Unhealthy")
      .human_regex(r"Readiness probe failed"),
    MatcherSpec::named("E2EContainerProbeFailedOrWarning")
      .namespace_regex(r"^e2e-container-probe-[0-9]+$")
      .reason_regex(r"^(Unhealthy|ProbeWarning)$"),
    MatcherSpec::named("E2ESCCFailedScheduling")
      .namespace_regex(r"^e2e-test-scc-[a-z0-9]+$")
      .reason_exact("FailedScheduling"),
    MatcherSpec::named("E2EPersistentVolumesFailedScheduling")
      .namespace_regex(r"^e2e-persistent-local-volumes-test-[0-9]+$")
      .reason_exact("FailedScheduling")
      .human_regex(r"volume node affinity conflict"),
    MatcherSpec::named("E2ESecurityContextBreaksNonRootPolicy")
      .namespace_regex(r"^e2e-security-context-test-[0-9]+$")
      .reason_exact("Failed")
      .human_regex(r"runAsUser breaks non-root policy"),
    MatcherSpec::named("BackOffPullingWebserverImage404")
      .namespace_regex(r"^e2e-")
      .reason_exact("BackOff")
      .human_regex(r#"Back-off pulling image "webserver:404""#),
    MatcherSpec::named("E2EInitContainerRestartBackoff")
      .namespace_regex(r"^e2e-init-container-[0-9]+$")
      .reason_exact("BackOff")
      .human_regex(r"Back-off restarting failed container"),
    MatcherSpec::named("E2EImagePullBackOff")
      .namespace_regex(r"^e2e-")
      .reason_exact("BackOff")
      .human_regex(r"Back-off pulling image"),
    MatcherSpec::named("MarketplaceStartupProbe")
      .namespace_regex(r"^openshift-marketplace$")
      .reason_exact("Unhealthy")
      .human_regex(r"Startup probe failed"),
    probe_error_liveness(),
    probe_error_timeout_awaiting_headers(),
    probe_error_connection_refused(),
    // A single control plane node restarts its own endpoints during upgrades.
    MatcherSpec::named("SingleNodeConnectionRefused")
      .namespace_regex(r"^openshift-")
      .reason_regex(r"^(ProbeError|Unhealthy)$")
      .human_regex(r"connect: connection refused")
      .topology(TopologyMode::SingleReplica),
    MatcherSpec::named("NodeConditionRecovered")
      .reason_regex(r"^(NodeHasNoDiskPressure|NodeHasSufficientMemory|NodeHasSufficientPID)$"),
    MatcherSpec::named("ErrorReconcilingNode")
      .reason_exact("ErrorReconcilingNode")
      .human_regex(r"nodeAdd: error adding node"),
    MatcherSpec::named("OperatorStatusChanged")
      .namespace_regex(r"^openshift-")
      .reason_exact("OperatorStatusChanged"),
    MatcherSpec::named("OpenStackFailedAttachVolume")
      .namespace_regex(r"^e2e-")
      .reason_exact("FailedAttachVolume")
      .platform(PlatformType::OpenStack),
    MatcherSpec::named("VSphereFailedMountDevice")
      .namespace_regex(r"^e2e-")
      .reason_exact("FailedMount")
      .human_regex(r"MountVolume\.MountDevice failed")
      .platform(PlatformType::VSphere),
  ]
}
