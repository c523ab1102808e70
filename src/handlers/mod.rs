pub mod auth;
pub mod contracts;
pub mod gigs;
pub mod messages;
pub mod notifications;
pub mod proposals;
pub mod ratings;
pub mod services;
pub mod users;

use actix_web::web;
use serde::Serialize;

/// Single-resource response envelope; lists use `pagination::Page` instead.
#[derive(Debug, Serialize)]
pub struct Data<T> {
    pub data: T,
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    // ── Auth routes (protected by JWT via the AuthenticatedUser extractor) ──
    cfg.service(
        web::scope("/auth")
            .route("/me", web::get().to(auth::me))
            .route("/complete-profile", web::post().to(auth::complete_profile)),
    );

    // ── User routes ──
    cfg.service(
        web::scope("/users")
            .route("/{id}", web::get().to(users::get_user))
            .route("/{id}", web::put().to(users::update_user))
            .route("/{id}/ratings", web::get().to(ratings::get_user_ratings))
            .route(
                "/{id}/ratings/summary",
                web::get().to(ratings::get_user_rating_summary),
            ),
    );

    // ── Gig routes ──
    cfg.service(
        web::scope("/gigs")
            .route("", web::get().to(gigs::list_gigs))
            .route("", web::post().to(gigs::create_gig))
            .route("/mine", web::get().to(gigs::my_gigs))
            .route("/{id}", web::get().to(gigs::get_gig))
            .route("/{id}", web::patch().to(gigs::update_gig))
            .route("/{id}/cancel", web::post().to(gigs::cancel_gig))
            .route(
                "/{id}/recount-proposals",
                web::post().to(gigs::recount_proposals),
            )
            .route(
                "/{gig_id}/proposals",
                web::get().to(proposals::list_gig_proposals),
            )
            .route(
                "/{gig_id}/proposals",
                web::post().to(proposals::submit_proposal),
            ),
    );

    // ── Proposal routes ──
    cfg.service(
        web::scope("/proposals")
            .route("/mine", web::get().to(proposals::my_proposals))
            .route("/{id}", web::get().to(proposals::get_proposal))
            .route("/{id}/shortlist", web::post().to(proposals::shortlist))
            .route("/{id}/accept", web::post().to(proposals::accept))
            .route("/{id}/reject", web::post().to(proposals::reject))
            .route("/{id}/withdraw", web::post().to(proposals::withdraw)),
    );

    // ── Contract routes ──
    cfg.service(
        web::scope("/contracts")
            .route("", web::get().to(contracts::list_contracts))
            .route("/{id}", web::get().to(contracts::get_contract))
            .route("/{id}/complete", web::post().to(contracts::mark_complete))
            .route(
                "/{id}/approve",
                web::post().to(contracts::approve_completion),
            )
            .route("/{id}/cancel", web::post().to(contracts::cancel))
            .route("/{id}/dispute", web::post().to(contracts::dispute))
            .route("/{id}/ratings", web::get().to(ratings::get_contract_ratings))
            .route("/{id}/ratings", web::post().to(ratings::rate_contract))
            .route(
                "/{id}/messages",
                web::get().to(messages::get_contract_messages),
            )
            .route(
                "/{id}/messages",
                web::post().to(messages::post_contract_message),
            )
            .route(
                "/{id}/messages/read-all",
                web::post().to(messages::read_all_contract_messages),
            )
            .route(
                "/{id}/messages/unread-count",
                web::get().to(messages::contract_unread_count),
            ),
    );

    // ── Message routes (cross-thread) ──
    cfg.service(web::scope("/messages").route("/{id}/read", web::put().to(messages::mark_read)));

    // ── Notification routes ──
    cfg.service(
        web::scope("/notifications")
            .route("", web::get().to(notifications::list))
            .route("/unread-count", web::get().to(notifications::unread_count))
            .route("/read-all", web::post().to(notifications::read_all))
            .route("/{id}/read", web::put().to(notifications::mark_read)),
    );

    // ── Service catalogue routes ──
    cfg.service(
        web::scope("/services")
            .route("", web::get().to(services::list_services))
            .route("", web::post().to(services::create_service))
            .route("/{id}", web::get().to(services::get_service))
            .route("/{id}", web::patch().to(services::update_service))
            .route("/{id}/requests", web::post().to(services::request_service)),
    );

    // ── Service request routes ──
    cfg.service(
        web::scope("/service-requests")
            .route("/mine", web::get().to(services::my_requests))
            .route("/{id}/accept", web::post().to(services::accept_request))
            .route("/{id}/decline", web::post().to(services::decline_request))
            .route(
                "/{id}/messages",
                web::get().to(messages::get_request_messages),
            )
            .route(
                "/{id}/messages",
                web::post().to(messages::post_request_message),
            )
            .route(
                "/{id}/messages/read-all",
                web::post().to(messages::read_all_request_messages),
            ),
    );
}
