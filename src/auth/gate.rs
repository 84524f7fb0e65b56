use actix_web::error::ErrorUnauthorized;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web::Data};
use futures::future::{Ready, ready};

use crate::config::Config;

/// Admission ticket for the reporting surface: the request must carry the
/// shared admin token in `x-admin-token`. This is a plain static credential
/// comparison, not an identity system.
pub struct AdminGate;

impl FromRequest for AdminGate {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let token = match req
            .headers()
            .get("x-admin-token")
            .and_then(|h| h.to_str().ok())
        {
            Some(t) => t,
            None => return ready(Err(ErrorUnauthorized("Missing admin token"))),
        };

        let config = match req.app_data::<Data<Config>>() {
            Some(c) => c,
            None => {
                return ready(Err(actix_web::error::ErrorInternalServerError(
                    "Config missing",
                )));
            }
        };

        if token == config.admin_token {
            ready(Ok(AdminGate))
        } else {
            ready(Err(ErrorUnauthorized("Invalid admin token")))
        }
    }
}
