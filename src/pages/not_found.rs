use leptos::prelude::*;

/// 404 Not Found Page
#[component]
pub fn NotFound() -> impl IntoView {
	view! {
		<div class="not-found">
			<h1>"Nothing here"</h1>
			<p>"The graph lives on the " <a href="/">"home page"</a> "."</p>
		</div>
	}
}
