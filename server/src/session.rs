//! Per-connection command loop

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use pokeduel_protocol::{BattleId, ClientEvent, ErrorCode, ServerEvent};
use tokio::net::TcpStream;

use crate::connection::{Connection, Inbound};
use crate::error::CommandError;
use crate::observer::ObserverHandle;
use crate::registry::BattleRegistry;

/// How long a closing connection may spend flushing queued events
const WRITER_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// The commands of one connection, applied against the registry
pub struct Session {
    handle: ObserverHandle,
    registry: Arc<BattleRegistry>,
    joined: HashSet<BattleId>,
}

impl Session {
    pub fn new(handle: ObserverHandle, registry: Arc<BattleRegistry>) -> Self {
        Self {
            handle,
            registry,
            joined: HashSet::new(),
        }
    }

    /// Apply one inbound frame. Failures are answered to this connection
    /// only.
    pub fn handle_inbound(&mut self, inbound: Inbound) {
        match inbound {
            Inbound::Event(event) => {
                if let Err(e) = self.dispatch(event) {
                    self.reply(ServerEvent::error(e.code(), e.to_string()));
                }
            }
            Inbound::Malformed(reason) => {
                tracing::warn!(observer = %self.handle.id(), error = %reason, "malformed frame");
                self.reply(ServerEvent::error(ErrorCode::TransportError, reason));
            }
        }
    }

    pub fn dispatch(&mut self, event: ClientEvent) -> Result<(), CommandError> {
        let observer = self.handle.id();

        match event {
            ClientEvent::Join { battle_id, side } => {
                self.registry.join(battle_id, &self.handle, side)?;
                self.joined.insert(battle_id);
            }
            ClientEvent::Leave { battle_id } => {
                self.registry.leave(battle_id, observer);
                self.joined.remove(&battle_id);
            }
            ClientEvent::Attack {
                battle_id,
                move_name,
            } => {
                self.registry.attack(battle_id, observer, &move_name)?;
            }
            ClientEvent::Surrender { battle_id } => {
                self.registry.surrender(battle_id, observer)?;
            }
            ClientEvent::Create {
                pokemon,
                opponent,
                mode,
            } => {
                let battle_id =
                    self.registry
                        .create_from_roster(&pokemon, opponent.as_deref(), mode)?;
                self.reply(ServerEvent::Created { battle_id });
            }
        }

        Ok(())
    }

    fn reply(&self, event: ServerEvent) {
        if let Err(e) = self.handle.send(event) {
            tracing::debug!(observer = %self.handle.id(), error = %e, "reply dropped");
        }
    }

    /// Deregister from every joined battle; the battles themselves stay
    pub fn close(&mut self) {
        for battle_id in self.joined.drain() {
            self.registry.leave(battle_id, self.handle.id());
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.close();
    }
}

/// Serve one accepted TCP connection until the peer goes away
pub async fn run(stream: TcpStream, registry: Arc<BattleRegistry>) -> Result<()> {
    let connection = Connection::accept(stream).await?;
    let peer = connection.peer();
    let (mut sink, mut events) = connection.split();

    let (handle, mut outgoing) = ObserverHandle::channel();
    let observer = handle.id();
    tracing::info!(%observer, %peer, "connection opened");

    let mut writer = tokio::spawn(async move {
        while let Some(event) = outgoing.recv().await {
            if let Err(e) = sink.send(&event).await {
                tracing::warn!(%observer, error = %e, "send failed");
                return;
            }
        }
        if let Err(e) = sink.close().await {
            tracing::debug!(%observer, error = %e, "close failed");
        }
    });

    let mut session = Session::new(handle, registry);
    loop {
        match events.next_event().await {
            Ok(Some(inbound)) => session.handle_inbound(inbound),
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(%observer, error = %e, "connection failed");
                break;
            }
        }
    }

    // dropping the session releases the last sender, so the writer drains
    // what is queued and stops
    drop(session);
    if tokio::time::timeout(WRITER_DRAIN_TIMEOUT, &mut writer)
        .await
        .is_err()
    {
        writer.abort();
    }

    tracing::info!(%observer, %peer, "connection closed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pokeduel_battle::{BattleMode, BattleStatus, Side};
    use tokio::sync::mpsc::Receiver;

    fn session() -> (Session, Receiver<ServerEvent>, Arc<BattleRegistry>) {
        let registry = Arc::new(BattleRegistry::new());
        let (handle, rx) = ObserverHandle::channel();
        (Session::new(handle, registry.clone()), rx, registry)
    }

    fn create(session: &mut Session, rx: &mut Receiver<ServerEvent>) -> BattleId {
        session.handle_inbound(Inbound::Event(ClientEvent::Create {
            pokemon: "Pikachu".to_string(),
            opponent: Some("Snorlax".to_string()),
            mode: BattleMode::VsComputer,
        }));
        match rx.try_recv().unwrap() {
            ServerEvent::Created { battle_id } => battle_id,
            other => panic!("expected created, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_create_join_attack() {
        let (mut session, mut rx, _registry) = session();
        let battle_id = create(&mut session, &mut rx);

        session.handle_inbound(Inbound::Event(ClientEvent::Join {
            battle_id,
            side: None,
        }));
        assert!(matches!(rx.try_recv().unwrap(), ServerEvent::Snapshot(_)));

        session.handle_inbound(Inbound::Event(ClientEvent::Attack {
            battle_id,
            move_name: "Thunderbolt".to_string(),
        }));
        let ServerEvent::Snapshot(snapshot) = rx.try_recv().unwrap() else {
            panic!("expected snapshot");
        };
        assert_eq!(snapshot.battle_log[0].move_name, "Thunderbolt");
        assert_eq!(snapshot.battle_log[0].attacker, Side::Player);
    }

    #[tokio::test]
    async fn test_errors_are_replied() {
        let (mut session, mut rx, _registry) = session();
        let battle_id = create(&mut session, &mut rx);

        session.handle_inbound(Inbound::Event(ClientEvent::Attack {
            battle_id,
            move_name: "Splash".to_string(),
        }));
        assert!(matches!(
            rx.try_recv().unwrap(),
            ServerEvent::Error {
                code: ErrorCode::UnknownMove,
                ..
            }
        ));

        session.handle_inbound(Inbound::Malformed("Empty message".to_string()));
        assert_eq!(
            rx.try_recv().unwrap(),
            ServerEvent::error(ErrorCode::TransportError, "Empty message")
        );

        session.handle_inbound(Inbound::Event(ClientEvent::Create {
            pokemon: "Missingno".to_string(),
            opponent: None,
            mode: BattleMode::VsComputer,
        }));
        assert!(matches!(
            rx.try_recv().unwrap(),
            ServerEvent::Error {
                code: ErrorCode::UnknownCombatant,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_close_leaves_but_keeps_battle() {
        let (mut session, mut rx, registry) = session();
        let battle_id = create(&mut session, &mut rx);
        session
            .dispatch(ClientEvent::Join {
                battle_id,
                side: None,
            })
            .unwrap();
        assert_eq!(registry.observer_count(battle_id), Some(1));

        drop(session);

        assert_eq!(registry.observer_count(battle_id), Some(0));
        assert_eq!(
            registry.snapshot(battle_id).unwrap().status,
            BattleStatus::Active
        );
    }

    #[tokio::test]
    async fn test_leave_stops_broadcasts() {
        let (mut session, mut rx, registry) = session();
        let battle_id = create(&mut session, &mut rx);
        session
            .dispatch(ClientEvent::Join {
                battle_id,
                side: None,
            })
            .unwrap();
        session.dispatch(ClientEvent::Leave { battle_id }).unwrap();
        while rx.try_recv().is_ok() {}

        session
            .dispatch(ClientEvent::Attack {
                battle_id,
                move_name: "Quick Attack".to_string(),
            })
            .unwrap();

        assert!(rx.try_recv().is_err());
        assert_eq!(registry.snapshot(battle_id).unwrap().battle_log.len(), 2);
    }
}
