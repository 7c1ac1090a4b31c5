//! Root application component with routing, context providers, and the
//! session bootstrap.

use leptos::prelude::*;
use leptos_meta::{MetaTags, Stylesheet, Title, provide_meta_context};
use leptos_router::{
    ParamSegment, StaticSegment,
    components::{Route, Router, Routes},
};

use crate::pages::{chat::ChatPage, signin::SignInPage, signup::SignUpPage, verify::VerifyPage};
use crate::state::chat::ChatState;
use crate::state::session::SessionState;
use crate::state::ui::UiState;

#[cfg(feature = "hydrate")]
use crate::state::session::StoreSession;

/// The concrete API gateway used in the browser.
#[cfg(feature = "hydrate")]
pub type AppApi = crate::net::api::Api<StoreSession, crate::net::gloo::GlooTransport>;

/// Fetch the shared API gateway from context.
#[cfg(feature = "hydrate")]
pub fn use_api() -> AppApi {
    expect_context::<AppApi>()
}

/// HTML shell rendered on the server for SSR + hydration.
pub fn shell(options: LeptosOptions) -> impl IntoView {
    view! {
        <!DOCTYPE html>
        <html lang="en">
            <head>
                <meta charset="utf-8"/>
                <meta name="viewport" content="width=device-width, initial-scale=1"/>
                <AutoReload options=options.clone()/>
                <HydrationScripts options/>
                <MetaTags/>
            </head>
            <body>
                <App/>
            </body>
        </html>
    }
}

/// Root application component.
///
/// Provides the session, chat, and UI state contexts, wires the API gateway
/// over the authenticated client, and bootstraps the persisted session.
#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    let session = RwSignal::new(SessionState::default());
    let chat = RwSignal::new(ChatState::default());
    let ui = RwSignal::new(UiState::default());

    provide_context(session);
    provide_context(chat);
    provide_context(ui);

    #[cfg(feature = "hydrate")]
    {
        use crate::net::api::Api;
        use crate::net::client::ApiClient;
        use crate::net::gloo::GlooTransport;

        let api: AppApi = Api::new(ApiClient::new(StoreSession::new(session, chat), GlooTransport));
        provide_context(api.clone());

        // Dark mode comes up before first paint settles.
        let dark = crate::util::storage::read_dark_preference();
        crate::util::storage::apply_dark_mode(dark);
        ui.update(|u| u.dark_mode = dark);

        bootstrap_session(api, session);
    }

    view! {
        <Stylesheet id="leptos" href="/pkg/converse.css"/>
        <Title text="Converse"/>

        <Router>
            <Routes fallback=|| "Page not found.".into_view()>
                <Route path=StaticSegment("signin") view=SignInPage/>
                <Route path=StaticSegment("signup") view=SignUpPage/>
                <Route path=(StaticSegment("verify"), ParamSegment("token")) view=VerifyPage/>
                <Route path=StaticSegment("") view=ChatPage/>
            </Routes>
        </Router>
    }
}

/// Restore the persisted user (token never persists) and settle the session
/// against the backend: the `fetch_me` call runs through the authenticated
/// client, so a valid refresh cookie transparently yields a fresh access
/// token on the way.
#[cfg(feature = "hydrate")]
fn bootstrap_session(api: AppApi, session: RwSignal<SessionState>) {
    use crate::net::error::RequestError;

    let restored = crate::util::storage::load_persisted_user();
    session.update(|s| s.user = restored);

    leptos::task::spawn_local(async move {
        match api.fetch_me().await {
            Ok(user) => {
                session.update(|s| {
                    s.set_user(Some(user));
                    s.loading = false;
                });
                session.with_untracked(crate::util::storage::store_persisted_user);
            }
            Err(err) => {
                if err.is_auth_failure() {
                    // Session already cleared by the client; nothing to keep.
                    leptos::logging::log!("session bootstrap: not authenticated");
                } else if matches!(err, RequestError::Transport(_)) {
                    // Offline start keeps the restored identity for display;
                    // authenticated calls will surface their own failures.
                    leptos::logging::warn!("session bootstrap offline: {err}");
                } else {
                    leptos::logging::warn!("session bootstrap failed: {err}");
                }
                session.update(|s| s.loading = false);
            }
        }
    });
}
