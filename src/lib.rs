pub mod http;

pub use http::{
    ClientConfig, FormRequest, Header, HttpClient, RedirectPolicy, Requester, SendRequest,
    StatusClassifier, StatusError, default_request, process_status_code,
};
