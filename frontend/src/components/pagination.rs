use pigeon_shared::models::Pagination;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct PaginationBarProps {
    pub pagination: Pagination,
    pub on_page: Callback<u32>,
}

#[function_component(PaginationBar)]
pub fn pagination_bar(props: &PaginationBarProps) -> Html {
    let p = &props.pagination;
    let on_prev = {
        let on_page = props.on_page.clone();
        let page = p.page;
        Callback::from(move |_| on_page.emit(page.saturating_sub(1)))
    };
    let on_next = {
        let on_page = props.on_page.clone();
        let page = p.page;
        Callback::from(move |_| on_page.emit(page + 1))
    };

    html! {
        <div class="pagination">
            <button class="btn btn-secondary" disabled={!p.has_prev} onclick={on_prev}>
                { "‹ Prev" }
            </button>
            <span class="pagination-info">
                { format!("Page {} of {} · {} mails", p.page, p.total_pages.max(1), p.total_count) }
            </span>
            <button class="btn btn-secondary" disabled={!p.has_next} onclick={on_next}>
                { "Next ›" }
            </button>
        </div>
    }
}
