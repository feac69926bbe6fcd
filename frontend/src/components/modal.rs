use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct ModalProps {
    pub title: AttrValue,
    pub on_close: Callback<()>,
    #[prop_or_default]
    pub children: Html,
}

#[function_component(Modal)]
pub fn modal(props: &ModalProps) -> Html {
    let on_backdrop = props.on_close.reform(|_: MouseEvent| ());
    let on_close = props.on_close.reform(|_: MouseEvent| ());
    let stop = Callback::from(|e: MouseEvent| e.stop_propagation());

    html! {
        <div class="modal-backdrop" onclick={on_backdrop}>
            <div class="modal" onclick={stop}>
                <div class="modal-header">
                    <h3>{ props.title.clone() }</h3>
                    <button class="modal-close" onclick={on_close}>{ "×" }</button>
                </div>
                <div class="modal-body">
                    { props.children.clone() }
                </div>
            </div>
        </div>
    }
}
