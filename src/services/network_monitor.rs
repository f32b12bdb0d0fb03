// ============================================================================
// MONITOR DE ESTADO DE RED
// ============================================================================
// Detecta cambios de conectividad (online/offline) para disparar la
// sincronización, con un modo simulado que ignora los eventos reales
// (usado en pruebas manuales y automáticas).
// ============================================================================

use std::sync::{Arc, Mutex};

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{window, Event};

/// Máquina de estados pura del monitor. Mientras `is_simulating` esté
/// activo, el estado observable sale de `simulated_status` y los eventos
/// reales del navegador no lo tocan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectivityState {
    is_online: bool,
    is_simulating: bool,
    simulated_status: bool,
}

impl ConnectivityState {
    pub fn new(is_online: bool) -> Self {
        Self {
            is_online,
            is_simulating: false,
            simulated_status: is_online,
        }
    }

    /// Evento online/offline real del navegador
    pub fn apply_real_event(&mut self, online: bool) {
        if !self.is_simulating {
            self.is_online = online;
        }
    }

    /// Entra en modo simulado partiendo del estado observable actual
    pub fn enable_simulation(&mut self) {
        self.simulated_status = self.is_online;
        self.is_simulating = true;
    }

    /// Sale del modo simulado y resincroniza con el estado real de red
    pub fn disable_simulation(&mut self, real_status: bool) {
        self.is_simulating = false;
        self.is_online = real_status;
    }

    /// Fija el estado simulado. Ignorado fuera del modo simulado.
    pub fn set_simulated_status(&mut self, status: bool) {
        if self.is_simulating {
            self.simulated_status = status;
        }
    }

    pub fn is_online(&self) -> bool {
        if self.is_simulating {
            self.simulated_status
        } else {
            self.is_online
        }
    }

    pub fn is_simulating(&self) -> bool {
        self.is_simulating
    }
}

/// Monitor de red con listeners de eventos del navegador.
/// Previene memory leaks: los listeners se registran una sola vez.
/// Las transiciones simuladas pasan por el mismo callback que las reales,
/// así los consumidores no distinguen entre ambas.
#[derive(Clone)]
pub struct NetworkMonitor {
    state: Arc<Mutex<ConnectivityState>>,
    monitoring_started: Arc<Mutex<bool>>,
    listener: Arc<Mutex<Option<Arc<dyn Fn(bool)>>>>,
}

impl NetworkMonitor {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(ConnectivityState::new(real_online_status()))),
            monitoring_started: Arc::new(Mutex::new(false)),
            listener: Arc::new(Mutex::new(None)),
        }
    }

    /// Registra los listeners online/offline del navegador.
    /// Llamadas repetidas se ignoran: solo se registra una vez.
    pub fn start_monitoring<F>(&self, callback: F)
    where
        F: Fn(bool) + 'static,
    {
        {
            let mut started = self.monitoring_started.lock().unwrap();
            if *started {
                log::warn!("⚠️ NetworkMonitor: listeners ya registrados, ignorando llamada duplicada");
                return;
            }
            *started = true;
        }

        let window = match window() {
            Some(w) => w,
            None => return,
        };

        let callback: Arc<dyn Fn(bool)> = Arc::new(callback);
        *self.listener.lock().unwrap() = Some(callback.clone());

        let online_closure = Closure::wrap(Box::new({
            let state = self.state.clone();
            let callback = callback.clone();
            move |_event: Event| {
                // Soltar el lock antes de invocar el callback
                let (online, simulating) = {
                    let mut state = state.lock().unwrap();
                    state.apply_real_event(true);
                    (state.is_online(), state.is_simulating())
                };
                if simulating {
                    log::info!("🌐 Evento online real ignorado (modo simulado)");
                } else {
                    log::info!("🌐 Red: ONLINE");
                    callback(online);
                }
            }
        }) as Box<dyn FnMut(Event)>);

        let offline_closure = Closure::wrap(Box::new({
            let state = self.state.clone();
            let callback = callback.clone();
            move |_event: Event| {
                let (online, simulating) = {
                    let mut state = state.lock().unwrap();
                    state.apply_real_event(false);
                    (state.is_online(), state.is_simulating())
                };
                if simulating {
                    log::info!("📴 Evento offline real ignorado (modo simulado)");
                } else {
                    log::warn!("📴 Red: OFFLINE");
                    callback(online);
                }
            }
        }) as Box<dyn FnMut(Event)>);

        let _ = window
            .add_event_listener_with_callback("online", online_closure.as_ref().unchecked_ref());
        let _ = window
            .add_event_listener_with_callback("offline", offline_closure.as_ref().unchecked_ref());

        // Los listeners de window persisten toda la vida de la app;
        // forget() mantiene vivos los closures.
        online_closure.forget();
        offline_closure.forget();

        log::info!("✅ NetworkMonitor: listeners registrados");
    }

    pub fn is_online(&self) -> bool {
        self.state.lock().unwrap().is_online()
    }

    pub fn is_simulating(&self) -> bool {
        self.state.lock().unwrap().is_simulating()
    }

    /// Entra en modo simulado: a partir de aquí los eventos reales no
    /// cambian el estado hasta disable_simulation().
    pub fn enable_simulation(&self) {
        self.state.lock().unwrap().enable_simulation();
        log::info!("🧪 Simulación de red activada");
    }

    /// Sale del modo simulado y vuelve al estado real de navigator.onLine
    pub fn disable_simulation(&self) {
        let real = real_online_status();
        let changed = {
            let mut state = self.state.lock().unwrap();
            let before = state.is_online();
            state.disable_simulation(real);
            before != state.is_online()
        };
        log::info!("🧪 Simulación de red desactivada (estado real: {})", real);
        if changed {
            self.notify(real);
        }
    }

    /// Fija el estado simulado y, si el estado observable cambia, lo
    /// propaga por el mismo callback que los eventos reales
    pub fn set_simulated_status(&self, status: bool) {
        let changed = {
            let mut state = self.state.lock().unwrap();
            let before = state.is_online();
            state.set_simulated_status(status);
            before != state.is_online()
        };
        if changed {
            self.notify(status);
        }
    }

    fn notify(&self, online: bool) {
        let listener = self.listener.lock().unwrap().clone();
        if let Some(listener) = listener {
            listener(online);
        }
    }
}

impl Default for NetworkMonitor {
    fn default() -> Self {
        Self::new()
    }
}

/// Lee navigator.onLine. Si no hay window/navigator (tests fuera del
/// navegador), asume online.
fn real_online_status() -> bool {
    let Some(window) = window() else {
        return true;
    };

    js_sys::Reflect::get(&window, &JsValue::from_str("navigator"))
        .ok()
        .and_then(|nav| js_sys::Reflect::get(&nav, &JsValue::from_str("onLine")).ok())
        .and_then(|v| v.as_bool())
        .unwrap_or(true)
}

#[cfg(test)]
mod tests {
    use super::ConnectivityState;

    #[test]
    fn eventos_reales_actualizan_el_estado() {
        let mut state = ConnectivityState::new(true);
        state.apply_real_event(false);
        assert!(!state.is_online());
        state.apply_real_event(true);
        assert!(state.is_online());
    }

    #[test]
    fn la_simulacion_ignora_eventos_reales() {
        let mut state = ConnectivityState::new(true);
        state.enable_simulation();
        state.set_simulated_status(false);
        assert!(!state.is_online());

        // Evento online real: no debe cambiar nada mientras se simula
        state.apply_real_event(true);
        assert!(!state.is_online());
    }

    #[test]
    fn desactivar_simulacion_resincroniza_con_la_red_real() {
        let mut state = ConnectivityState::new(false);
        state.enable_simulation();
        state.set_simulated_status(true);
        assert!(state.is_online());

        state.disable_simulation(false);
        assert!(!state.is_online());
        assert!(!state.is_simulating());
    }

    #[test]
    fn activar_simulacion_parte_del_estado_visible() {
        let mut state = ConnectivityState::new(false);
        state.enable_simulation();
        // Sin set_simulated_status todavía: se sigue viendo offline
        assert!(!state.is_online());
        assert!(state.is_simulating());
    }

    #[test]
    fn set_simulated_status_fuera_de_simulacion_es_noop() {
        let mut state = ConnectivityState::new(true);
        state.set_simulated_status(false);
        assert!(state.is_online());
    }
}
