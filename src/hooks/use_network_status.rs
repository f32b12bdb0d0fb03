use yew::prelude::*;

use crate::services::NetworkMonitor;

/// Estado de conectividad reactivo para componentes.
/// `monitor` queda expuesto para los controles de simulación; las
/// transiciones simuladas pasan por el mismo callback que los eventos
/// reales, así que `is_online` también las refleja.
#[derive(Clone)]
pub struct UseNetworkStatusHandle {
    pub is_online: UseStateHandle<bool>,
    pub monitor: NetworkMonitor,
}

#[hook]
pub fn use_network_status() -> UseNetworkStatusHandle {
    let monitor = (*use_state(NetworkMonitor::new)).clone();
    let is_online = use_state(|| monitor.is_online());

    // Registrar listeners una sola vez, al montar
    {
        let monitor = monitor.clone();
        let is_online = is_online.clone();
        use_effect_with((), move |_| {
            monitor.start_monitoring(move |online| {
                is_online.set(online);
            });
            || ()
        });
    }

    UseNetworkStatusHandle { is_online, monitor }
}
