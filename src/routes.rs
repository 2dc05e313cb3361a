use crate::api::{employee, leave};
use actix_governor::{
    Governor, GovernorConfig, GovernorConfigBuilder, PeerIpKeyExtractor,
    governor::middleware::NoOpMiddleware,
};
use actix_web::web;
use anyhow::anyhow;

pub type RateLimit = GovernorConfig<PeerIpKeyExtractor, NoOpMiddleware>;

/// Per-peer-IP limiter allowing `requests_per_min` with an equal burst.
pub fn build_limiter(requests_per_min: u32) -> anyhow::Result<RateLimit> {
    let ms_per_request = 60_000 / u64::from(requests_per_min.max(1));
    GovernorConfigBuilder::default()
        .milliseconds_per_request(ms_per_request.max(1))
        .burst_size(requests_per_min.max(1))
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .ok_or_else(|| anyhow!("invalid rate limit: {requests_per_min} requests/min"))
}

pub fn configure(cfg: &mut web::ServiceConfig, api_prefix: &str, limiter: &RateLimit) {
    cfg.service(
        web::scope(api_prefix)
            .wrap(Governor::new(limiter))
            .service(
                web::scope("/employee")
                    // /employee
                    .service(
                        web::resource("")
                            .route(web::post().to(employee::create_employee))
                            .route(web::get().to(employee::list_employees)),
                    )
                    // /employee/names (before /{id} so it is not parsed as an id)
                    .service(
                        web::resource("/names").route(web::get().to(employee::list_employee_names)),
                    )
                    // /employee/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::put().to(employee::update_employee))
                            .route(web::get().to(employee::get_employee))
                            .route(web::delete().to(employee::delete_employee)),
                    ),
            )
            .service(
                web::scope("/leave")
                    // /leave
                    .service(
                        web::resource("")
                            .route(web::get().to(leave::leave_list))
                            .route(web::post().to(leave::create_leave)),
                    )
                    // /leave/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(leave::get_leave))
                            .route(web::put().to(leave::modify_leave))
                            .route(web::delete().to(leave::delete_leave)),
                    ),
            ),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limiter_builds_for_edge_rates() {
        // zero and rates above one request per millisecond are clamped
        for rpm in [0, 1, 60, 1000, 120_000] {
            assert!(build_limiter(rpm).is_ok(), "rate {rpm} rejected");
        }
    }
}
