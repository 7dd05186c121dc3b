use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct SettingsModalProps {
    pub show: bool,
    pub on_close: Callback<()>,
    pub on_new_city: Callback<()>,
}

#[function_component]
pub fn SettingsModal(props: &SettingsModalProps) -> Html {
    if !props.show {
        return html! {};
    }

    let close_cb = {
        let cb = props.on_close.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let new_city_cb = {
        let cb = props.on_new_city.clone();
        Callback::from(move |_| {
            let confirmed = web_sys::window()
                .and_then(|win| {
                    win.confirm_with_message(
                        "This will WIPE your city (buildings, resources, achievements) and start fresh. Are you sure?",
                    )
                    .ok()
                })
                .unwrap_or(true);
            if confirmed {
                cb.emit(());
            }
        })
    };

    html! {<div style="position:fixed; inset:0; display:flex; align-items:center; justify-content:center; background:rgba(0,0,0,0.55); z-index:50;">
        <div style="background:#161b22; border:1px solid #30363d; border-radius:12px; padding:16px 20px; min-width:340px; max-width:480px; display:flex; flex-direction:column; gap:14px;">
            <div style="display:flex; justify-content:space-between; align-items:center;">
                <h3 style="margin:0; font-size:18px;">{"Settings"}</h3>
                <button onclick={close_cb.clone()} style="padding:4px 8px;">{"Close"}</button>
            </div>
            <div style="display:flex; gap:8px; flex-wrap:wrap;">
                <button onclick={new_city_cb} style="background:#f85149; border:1px solid #b62324; color:#fff; flex:1;">{"New City (Wipe Save)"}</button>
                <button onclick={close_cb} style="flex:0 0 auto;">{"Done"}</button>
            </div>
            <div style="font-size:11px; line-height:1.4; opacity:0.7;">{"Your city is saved in this browser after every change."}</div>
        </div>
    </div>}
}
