//! Email-verification page for `GET /auth/verify/{token}` links.

use leptos::prelude::*;
use leptos_router::hooks::use_params_map;

/// Outcome of the verification call. An invalid or expired link is rendered
/// distinctly from a network failure so the user knows whether retrying the
/// same link can help.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum VerifyStatus {
    Pending,
    Verified,
    InvalidLink,
    NetworkFailure,
}

/// Verification landing page; fires the verify call once for the token in
/// the URL and renders the outcome.
#[component]
pub fn VerifyPage() -> impl IntoView {
    let params = use_params_map();
    let status = RwSignal::new(VerifyStatus::Pending);

    #[cfg(feature = "hydrate")]
    {
        use crate::net::error::RequestError;

        let api = crate::app::use_api();
        let token = params.with_untracked(|p| p.get("token").unwrap_or_default());

        if token.is_empty() {
            status.set(VerifyStatus::InvalidLink);
        } else {
            leptos::task::spawn_local(async move {
                match api.verify(&token).await {
                    Ok(()) => status.set(VerifyStatus::Verified),
                    Err(RequestError::Transport(err)) => {
                        leptos::logging::warn!("verification unreachable: {err}");
                        status.set(VerifyStatus::NetworkFailure);
                    }
                    Err(err) => {
                        leptos::logging::warn!("verification rejected: {err}");
                        status.set(VerifyStatus::InvalidLink);
                    }
                }
            });
        }
    }
    #[cfg(not(feature = "hydrate"))]
    let _ = params;

    view! {
        <div class="auth-page">
            <div class="auth-card verify-card">
                {move || match status.get() {
                    VerifyStatus::Pending => view! {
                        <h1 class="auth-card__title">"Verifying..."</h1>
                        <p>"Hold on while we confirm your email."</p>
                    }
                    .into_any(),
                    VerifyStatus::Verified => view! {
                        <h1 class="auth-card__title">"Email verified"</h1>
                        <p>"Your account is ready. "<a href="/signin">"Sign in"</a></p>
                    }
                    .into_any(),
                    VerifyStatus::InvalidLink => view! {
                        <h1 class="auth-card__title">"Invalid link"</h1>
                        <p>"This verification link is invalid or has expired. Sign up again to receive a new one."</p>
                    }
                    .into_any(),
                    VerifyStatus::NetworkFailure => view! {
                        <h1 class="auth-card__title">"Connection problem"</h1>
                        <p>"We couldn't reach the server. Check your connection and reload this page."</p>
                    }
                    .into_any(),
                }}
            </div>
        </div>
    }
}
