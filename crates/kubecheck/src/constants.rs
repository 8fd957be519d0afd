pub const KUBECHECK_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const CONNECT_PATH: &str = "/api/clusters/connect";
pub const KUBEFILE_FIELD: &str = "kubefile";

/// Upper bound on the whole multipart request body.
pub const MAX_UPLOAD_BYTES: usize = 10 << 20;
