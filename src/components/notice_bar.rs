//! Transient notice banner, the toast surface for store-level outcomes.

use leptos::prelude::*;

use crate::state::ui::{NoticeKind, UiState};

/// Renders the current notice from [`UiState`], if any, with a dismiss
/// button. Success and error notices differ only by class.
#[component]
pub fn NoticeBar() -> impl IntoView {
    let ui = expect_context::<RwSignal<UiState>>();

    view! {
        <Show when=move || ui.get().notice.is_some()>
            {move || {
                ui.get().notice.map(|notice| {
                    let kind_class = match notice.kind {
                        NoticeKind::Success => "notice-bar--success",
                        NoticeKind::Error => "notice-bar--error",
                    };
                    view! {
                        <div class=format!("notice-bar {kind_class}")>
                            <span class="notice-bar__text">{notice.text}</span>
                            <button
                                class="notice-bar__dismiss"
                                on:click=move |_| ui.update(|u| u.dismiss_notice())
                            >
                                "\u{d7}"
                            </button>
                        </div>
                    }
                })
            }}
        </Show>
    }
}
