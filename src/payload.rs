use chrono::Utc;
use serde::Serialize;

/// Ref the workflow runs against when no dispatcher config says otherwise.
pub const DEFAULT_GIT_REF: &str = "main";

const EXTERNAL_REF_PREFIX: &str = "cli-client";

/// Body of a workflow dispatch request.
///
/// Built once by [`build_payload`] (or [`Dispatcher::build_payload`]) and then
/// moved into the dispatcher. Fields are read-only:
///
/// ```compile_fail
/// let mut payload = workflow_dispatch::build_payload("mock-rock", "dHJpZ2dlcg==");
/// payload.git_ref = String::from("feature");
/// ```
///
/// [`Dispatcher::build_payload`]: crate::Dispatcher::build_payload
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DispatchPayload {
    #[serde(rename = "ref")]
    git_ref: String,
    inputs: DispatchInputs,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
struct DispatchInputs {
    #[serde(rename = "oci-image-name")]
    image_name: String,
    #[serde(rename = "b64-image-trigger")]
    image_trigger_blob: String,
    upload: bool,
    external_ref_id: String,
}

impl DispatchPayload {
    pub(crate) fn at(
        git_ref: impl Into<String>,
        image_name: impl Into<String>,
        image_trigger_blob: impl Into<String>,
        unix_seconds: i64,
    ) -> Self {
        let image_name = image_name.into();
        let external_ref_id = external_ref_id(&image_name, unix_seconds);
        Self {
            git_ref: git_ref.into(),
            inputs: DispatchInputs {
                image_name,
                image_trigger_blob: image_trigger_blob.into(),
                upload: true,
                external_ref_id,
            },
        }
    }

    pub fn git_ref(&self) -> &str {
        &self.git_ref
    }

    pub fn image_name(&self) -> &str {
        &self.inputs.image_name
    }

    pub fn image_trigger_blob(&self) -> &str {
        &self.inputs.image_trigger_blob
    }

    pub fn upload(&self) -> bool {
        self.inputs.upload
    }

    /// Correlation id the remote workflow reports status under. Keep it to
    /// track the run.
    pub fn external_ref_id(&self) -> &str {
        &self.inputs.external_ref_id
    }
}

/// `cli-client-<image>-<unix seconds>`. Two ids for the same image within
/// one second are identical.
pub fn external_ref_id(image_name: &str, unix_seconds: i64) -> String {
    format!("{EXTERNAL_REF_PREFIX}-{image_name}-{unix_seconds}")
}

/// Builds the payload for `image_name` against [`DEFAULT_GIT_REF`], reading
/// the clock once for the correlation id.
pub fn build_payload(
    image_name: impl Into<String>,
    image_trigger_blob: impl Into<String>,
) -> DispatchPayload {
    DispatchPayload::at(
        DEFAULT_GIT_REF,
        image_name,
        image_trigger_blob,
        Utc::now().timestamp(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_payload_fixes_ref_and_upload() {
        let payload = build_payload("mock-rock", "c291cmNlOiB0ZXN0");

        assert_eq!(payload.git_ref(), "main");
        assert!(payload.upload());
        assert_eq!(payload.image_name(), "mock-rock");
        assert_eq!(payload.image_trigger_blob(), "c291cmNlOiB0ZXN0");
    }

    #[test]
    fn external_ref_id_has_prefix_image_and_integer_suffix() {
        let before = Utc::now().timestamp();
        let payload = build_payload("mock-rock", "");
        let after = Utc::now().timestamp();

        let suffix = payload
            .external_ref_id()
            .strip_prefix("cli-client-mock-rock-")
            .expect("correlation id should start with prefix and image name");
        let seconds: i64 = suffix.parse().expect("suffix should be unix seconds");
        assert!((before..=after).contains(&seconds));
    }

    #[test]
    fn image_names_with_dashes_are_kept_verbatim() {
        assert_eq!(
            external_ref_id("ubuntu-pro-base", 1_700_000_000),
            "cli-client-ubuntu-pro-base-1700000000"
        );
    }

    #[test]
    fn ids_differ_across_seconds_and_coincide_within_one() {
        let first = DispatchPayload::at("main", "mock-rock", "", 1_700_000_000);
        let same_second = DispatchPayload::at("main", "mock-rock", "", 1_700_000_000);
        let next_second = DispatchPayload::at("main", "mock-rock", "", 1_700_000_001);

        assert_eq!(first.external_ref_id(), same_second.external_ref_id());
        assert_ne!(first.external_ref_id(), next_second.external_ref_id());
    }

    #[test]
    fn serializes_to_workflow_dispatch_shape() {
        let payload = DispatchPayload::at("main", "mock-rock", "YmxvYg==", 42);
        let json = sonic_rs::to_string(&payload).expect("payload should serialize");

        assert_eq!(
            json,
            r#"{"ref":"main","inputs":{"oci-image-name":"mock-rock","b64-image-trigger":"YmxvYg==","upload":true,"external_ref_id":"cli-client-mock-rock-42"}}"#
        );
    }
}
