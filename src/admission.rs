use actix_web::body::{BoxBody, MessageBody};
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::http::header::{
    HeaderMap, HeaderValue, ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS,
    ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_REQUEST_HEADERS,
    ORIGIN, VARY,
};
use actix_web::http::Method;
use actix_web::{web, HttpResponse};
use actix_web_lab::middleware::Next;

const ALLOWED_METHODS: &str = "POST";

#[derive(Debug, Clone)]
pub struct AllowedOrigins(Vec<String>);

impl AllowedOrigins {
    pub fn new(origins: Vec<String>) -> Self {
        Self(origins)
    }
    pub fn contains(&self, origin: &str) -> bool {
        self.0.iter().any(|allowed| allowed == origin)
    }
}

impl std::fmt::Display for AllowedOrigins {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.join(", "))
    }
}

enum Admission {
    // curl, server-to-server, mobile apps
    NoOrigin,
    Allowed(HeaderValue),
    Rejected,
}

fn admit(headers: &HeaderMap, allowed_origins: &AllowedOrigins) -> Admission {
    let Some(origin) = headers.get(ORIGIN) else {
        return Admission::NoOrigin;
    };
    match origin.to_str() {
        Ok(value) if allowed_origins.contains(value) => Admission::Allowed(origin.clone()),
        _ => Admission::Rejected,
    }
}

fn set_cors_headers(headers: &mut HeaderMap, origin: HeaderValue) {
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, origin);
    headers.insert(
        ACCESS_CONTROL_ALLOW_CREDENTIALS,
        HeaderValue::from_static("true"),
    );
    headers.insert(VARY, HeaderValue::from_static("Origin"));
}

fn preflight_response(request_headers: &HeaderMap, origin: Option<HeaderValue>) -> HttpResponse {
    let mut response = HttpResponse::NoContent().finish();
    let headers = response.headers_mut();
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOWED_METHODS),
    );
    if let Some(requested) = request_headers.get(ACCESS_CONTROL_REQUEST_HEADERS) {
        headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, requested.clone());
    }
    if let Some(origin) = origin {
        set_cors_headers(headers, origin);
    }
    response
}

pub async fn admit_origin(
    request: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<BoxBody>, actix_web::Error> {
    let admission = match request.app_data::<web::Data<AllowedOrigins>>() {
        Some(allowed_origins) => admit(request.headers(), allowed_origins),
        None => Admission::Rejected,
    };

    let origin = match admission {
        Admission::Rejected => {
            tracing::warn!(
                origin = ?request.headers().get(ORIGIN),
                path = %request.path(),
                "Not allowed by CORS"
            );
            return Ok(request.into_response(HttpResponse::Forbidden().finish()));
        }
        Admission::NoOrigin => None,
        Admission::Allowed(origin) => Some(origin),
    };

    if *request.method() == Method::OPTIONS {
        let response = preflight_response(request.headers(), origin);
        return Ok(request.into_response(response));
    }

    let mut response = next.call(request).await?.map_into_boxed_body();
    if let Some(origin) = origin {
        set_cors_headers(response.headers_mut(), origin);
    }
    Ok(response)
}
