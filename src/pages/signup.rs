//! Sign-up page: registration form against `POST /auth/signup`.

use leptos::prelude::*;

use crate::components::notice_bar::NoticeBar;
use crate::state::ui::UiState;

/// Registration page. The backend owns the real validation rules; the form
/// only refuses obviously incomplete input and mismatched passwords before
/// submitting. Backend rejections surface their detail message.
#[component]
pub fn SignUpPage() -> impl IntoView {
    let ui = expect_context::<RwSignal<UiState>>();

    let username = RwSignal::new(String::new());
    let email = RwSignal::new(String::new());
    let first_name = RwSignal::new(String::new());
    let last_name = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let confirm_password = RwSignal::new(String::new());
    let submitting = RwSignal::new(false);
    let local_error = RwSignal::new(None::<String>);

    #[cfg(feature = "hydrate")]
    let navigate = leptos_router::hooks::use_navigate();
    #[cfg(feature = "hydrate")]
    let api = crate::app::use_api();
    #[cfg(not(feature = "hydrate"))]
    let _ = ui;

    let submit = move || {
        if submitting.get() {
            return;
        }
        if username.get().trim().is_empty()
            || email.get().trim().is_empty()
            || password.get().is_empty()
        {
            local_error.set(Some("Username, email, and password are required.".to_owned()));
            return;
        }
        if password.get() != confirm_password.get() {
            local_error.set(Some("Passwords do not match.".to_owned()));
            return;
        }
        local_error.set(None);

        #[cfg(feature = "hydrate")]
        {
            use crate::net::error::RequestError;
            use crate::net::types::SignUpRequest;

            let api = api.clone();
            let navigate = navigate.clone();
            submitting.set(true);
            leptos::task::spawn_local(async move {
                let req = SignUpRequest {
                    username: username.get_untracked().trim().to_owned(),
                    email: email.get_untracked().trim().to_owned(),
                    first_name: first_name.get_untracked().trim().to_owned(),
                    last_name: last_name.get_untracked().trim().to_owned(),
                    password: password.get_untracked(),
                    confirm_password: confirm_password.get_untracked(),
                };
                match api.sign_up(&req).await {
                    Ok(_) => {
                        ui.update(|u| {
                            u.notify_success(
                                "Registration successful. Please check your email to verify.",
                            );
                        });
                        navigate("/signin", leptos_router::NavigateOptions::default());
                    }
                    Err(RequestError::Validation { message, .. }) => {
                        ui.update(|u| u.notify_error(message));
                    }
                    Err(err) => {
                        leptos::logging::warn!("sign up failed: {err}");
                        ui.update(|u| u.notify_error("Registration failed"));
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

    let text_field = move |label: &'static str, ty: &'static str, value: RwSignal<String>| {
        view! {
            <label class="auth-card__label">
                {label}
                <input
                    class="auth-card__input"
                    type=ty
                    prop:value=move || value.get()
                    on:input=move |ev| value.set(event_target_value(&ev))
                />
            </label>
        }
    };

    view! {
        <div class="auth-page">
            <NoticeBar/>
            <form class="auth-card" on:submit=on_submit>
                <h1 class="auth-card__title">"Create your account"</h1>

                {text_field("Username", "text", username)}
                {text_field("Email", "email", email)}
                {text_field("First name", "text", first_name)}
                {text_field("Last name", "text", last_name)}
                {text_field("Password", "password", password)}
                {text_field("Confirm password", "password", confirm_password)}

                <Show when=move || local_error.get().is_some()>
                    <p class="auth-card__error">{move || local_error.get().unwrap_or_default()}</p>
                </Show>

                <button class="btn btn--primary auth-card__submit" type="submit" disabled=move || submitting.get()>
                    {move || if submitting.get() { "Creating account..." } else { "Sign up" }}
                </button>

                <p class="auth-card__footer">
                    "Already have an account? "
                    <a href="/signin">"Sign in"</a>
                </p>
            </form>
        </div>
    }
}
