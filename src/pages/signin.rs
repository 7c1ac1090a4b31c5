//! Sign-in page: email/password form against `POST /auth/signin`.

use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::hooks::use_navigate;

use crate::components::notice_bar::NoticeBar;
use crate::state::session::SessionState;
use crate::state::ui::UiState;

/// Sign-in page. On success the access token and user land in the session
/// store and the router moves to the chat shell; any failure shows a generic
/// "Sign in failed" notice (credentials are never echoed back).
#[component]
pub fn SignInPage() -> impl IntoView {
    let session = expect_context::<RwSignal<SessionState>>();
    let ui = expect_context::<RwSignal<UiState>>();
    let navigate = use_navigate();

    let email = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let submitting = RwSignal::new(false);

    // Already signed in: go straight to the chat shell.
    Effect::new(move || {
        let state = session.get();
        if !state.loading && state.is_authenticated() {
            navigate("/", NavigateOptions::default());
        }
    });

    #[cfg(feature = "hydrate")]
    let api = crate::app::use_api();
    #[cfg(not(feature = "hydrate"))]
    let _ = ui;

    let submit = move || {
        if submitting.get() || email.get().trim().is_empty() || password.get().is_empty() {
            return;
        }

        #[cfg(feature = "hydrate")]
        {
            use crate::net::types::SignInRequest;

            let api = api.clone();
            submitting.set(true);
            leptos::task::spawn_local(async move {
                let req = SignInRequest {
                    email: email.get_untracked().trim().to_owned(),
                    password: password.get_untracked(),
                };
                match sign_in_flow(&api, &req, session).await {
                    Ok(()) => ui.update(|u| u.dismiss_notice()),
                    Err(err) => {
                        leptos::logging::warn!("sign in failed: {err}");
                        ui.update(|u| u.notify_error("Sign in failed"));
                    }
                }
                submitting.set(false);
            });
        }
    };

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        submit();
    };

    view! {
        <div class="auth-page">
            <NoticeBar/>
            <form class="auth-card" on:submit=on_submit>
                <h1 class="auth-card__title">"Converse"</h1>
                <p class="auth-card__subtitle">"Welcome back! Sign in to continue."</p>

                <label class="auth-card__label">
                    "Email"
                    <input
                        class="auth-card__input"
                        type="email"
                        placeholder="johndoe@example.com"
                        prop:value=move || email.get()
                        on:input=move |ev| email.set(event_target_value(&ev))
                    />
                </label>

                <label class="auth-card__label">
                    "Password"
                    <input
                        class="auth-card__input"
                        type="password"
                        prop:value=move || password.get()
                        on:input=move |ev| password.set(event_target_value(&ev))
                    />
                </label>

                <button class="btn btn--primary auth-card__submit" type="submit" disabled=move || submitting.get()>
                    {move || if submitting.get() { "Signing in..." } else { "Sign in" }}
                </button>

                <p class="auth-card__footer">
                    "Don't have an account? "
                    <a href="/signup">"Sign up"</a>
                </p>
            </form>
        </div>
    }
}

/// Token first, then the user record: `sign_in` installs the access token,
/// `fetch_me` populates the identity (a refresh never does that part), and
/// only then is the allow-listed record persisted.
#[cfg(feature = "hydrate")]
async fn sign_in_flow(
    api: &crate::app::AppApi,
    req: &crate::net::types::SignInRequest,
    session: RwSignal<SessionState>,
) -> Result<(), crate::net::error::RequestError> {
    let token = api.sign_in(req).await?;
    session.update(|s| s.set_access_token(token.access_token));

    let user = api.fetch_me().await?;
    session.update(|s| {
        s.set_user(Some(user));
        s.loading = false;
    });
    session.with_untracked(crate::util::storage::store_persisted_user);
    Ok(())
}
