//! 基于 rumqttc 的 MQTT 会话

use super::{BrokerError, BrokerSession};
use crate::config::MqttConfig;
use rumqttc::{
    AsyncClient, ConnectReturnCode, ConnectionError, Event, EventLoop, MqttOptions, Outgoing,
    Packet, QoS, SubscribeReasonCode,
};
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, warn};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const KEEP_ALIVE: Duration = Duration::from_secs(30);
/// rumqttc 请求队列容量
const REQUEST_CAPACITY: usize = 10;
/// MQTT 协议允许的最大报文（剩余长度上限 256 MiB）；rumqttc 默认只收 10 KiB
pub const MAX_PACKET_SIZE: usize = 256 * 1024 * 1024;

pub struct MqttSession {
    client: AsyncClient,
    eventloop: EventLoop,
    topic: String,
}

/// 每个进程一个客户端 ID
fn client_id() -> String {
    format!("mqtt-desktop-notify-{}", std::process::id())
}

/// 根据配置构建连接参数；端口非法时返回错误
pub fn mqtt_options(config: &MqttConfig) -> Result<MqttOptions, BrokerError> {
    let port: u16 = config
        .port
        .trim()
        .parse()
        .map_err(|_| BrokerError::InvalidPort(config.port.clone()))?;

    let mut options = MqttOptions::new(client_id(), config.server.clone(), port);
    options.set_keep_alive(KEEP_ALIVE);
    options.set_clean_session(true);
    options.set_max_packet_size(MAX_PACKET_SIZE, MAX_PACKET_SIZE);
    if let Some((username, password)) = config.credentials() {
        options.set_credentials(username, password);
    }
    Ok(options)
}

impl MqttSession {
    /// 连接代理并等待 CONNACK
    pub async fn connect(config: &MqttConfig) -> Result<Self, BrokerError> {
        let addr = format!("tcp://{}:{}", config.server, config.port);
        let options = mqtt_options(config)?;
        info!(broker = %addr, auth = config.credentials().is_some(), "Connecting to MQTT broker");

        let (client, mut eventloop) = AsyncClient::new(options, REQUEST_CAPACITY);

        let handshake = async {
            loop {
                match eventloop.poll().await {
                    Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                        if ack.code == ConnectReturnCode::Success {
                            return Ok(());
                        }
                        return Err(BrokerError::Refused {
                            addr: addr.clone(),
                            code: format!("{:?}", ack.code),
                        });
                    }
                    Ok(event) => debug!(?event, "MQTT event during connect"),
                    Err(ConnectionError::ConnectionRefused(code)) => {
                        return Err(BrokerError::Refused {
                            addr: addr.clone(),
                            code: format!("{:?}", code),
                        })
                    }
                    Err(e) => {
                        return Err(BrokerError::Connect {
                            addr: addr.clone(),
                            message: e.to_string(),
                        })
                    }
                }
            }
        };

        let outcome = timeout(CONNECT_TIMEOUT, handshake).await;
        match outcome {
            Ok(result) => result?,
            Err(_) => {
                return Err(BrokerError::ConnectTimeout {
                    addr: addr.clone(),
                    secs: CONNECT_TIMEOUT.as_secs(),
                })
            }
        }

        info!(broker = %addr, "Connected to MQTT broker");
        Ok(Self {
            client,
            eventloop,
            topic: String::new(),
        })
    }

    /// 以 QoS 0 订阅单个 topic 并等待 SUBACK
    pub async fn subscribe(&mut self, topic: &str) -> Result<(), BrokerError> {
        let subscribe_error = |message: String| BrokerError::Subscribe {
            topic: topic.to_string(),
            message,
        };

        self.client
            .subscribe(topic, QoS::AtMostOnce)
            .await
            .map_err(|e| subscribe_error(e.to_string()))?;

        loop {
            match self.eventloop.poll().await {
                Ok(Event::Incoming(Packet::SubAck(ack))) => {
                    if ack
                        .return_codes
                        .iter()
                        .any(|code| matches!(code, SubscribeReasonCode::Failure))
                    {
                        return Err(BrokerError::SubscribeRejected {
                            topic: topic.to_string(),
                        });
                    }
                    break;
                }
                Ok(event) => debug!(?event, "MQTT event during subscribe"),
                Err(e) => return Err(subscribe_error(e.to_string())),
            }
        }

        self.topic = topic.to_string();
        info!(topic = %topic, "Subscribed");
        Ok(())
    }
}

impl BrokerSession for MqttSession {
    async fn next_payload(&mut self) -> Result<Option<Vec<u8>>, BrokerError> {
        loop {
            match self.eventloop.poll().await {
                Ok(Event::Incoming(Packet::Publish(publish))) => {
                    debug!(topic = %publish.topic, bytes = publish.payload.len(), "Message received");
                    return Ok(Some(publish.payload.to_vec()));
                }
                Ok(Event::Incoming(Packet::Disconnect)) => {
                    warn!(topic = %self.topic, "Broker closed the session");
                    return Ok(None);
                }
                Ok(_) => {}
                Err(e) => return Err(BrokerError::ConnectionLost(e.to_string())),
            }
        }
    }

    async fn disconnect(mut self, grace: Duration) {
        if let Err(e) = self.client.disconnect().await {
            warn!(error = %e, "Failed to request MQTT disconnect");
            return;
        }

        let drain = async {
            loop {
                match self.eventloop.poll().await {
                    Ok(Event::Outgoing(Outgoing::Disconnect)) | Err(_) => break,
                    Ok(_) => {}
                }
            }
        };
        if timeout(grace, drain).await.is_err() {
            debug!("MQTT disconnect grace period elapsed");
        }
        info!("Disconnected from MQTT broker");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    /// 读一个完整的 MQTT 报文，返回固定头首字节和其余内容
    async fn read_packet(stream: &mut TcpStream) -> (u8, Vec<u8>) {
        let header = stream.read_u8().await.unwrap();
        let mut len = 0usize;
        let mut shift = 0;
        loop {
            let byte = stream.read_u8().await.unwrap();
            len |= ((byte & 0x7f) as usize) << shift;
            if byte & 0x80 == 0 {
                break;
            }
            shift += 7;
        }
        let mut body = vec![0; len];
        stream.read_exact(&mut body).await.unwrap();
        (header, body)
    }

    fn publish_packet(topic: &str, payload: &[u8]) -> Vec<u8> {
        let mut packet = vec![0x30];
        let mut len = 2 + topic.len() + payload.len();
        loop {
            let mut byte = (len % 128) as u8;
            len /= 128;
            if len > 0 {
                byte |= 0x80;
            }
            packet.push(byte);
            if len == 0 {
                break;
            }
        }
        packet.extend_from_slice(&(topic.len() as u16).to_be_bytes());
        packet.extend_from_slice(topic.as_bytes());
        packet.extend_from_slice(payload);
        packet
    }

    /// 本地单连接代理：按给定的返回码应答 CONNECT 和 SUBSCRIBE
    struct FakeBroker {
        connack_code: u8,
        suback_code: u8,
        publish: Option<Vec<u8>>,
    }

    impl FakeBroker {
        fn accepting() -> Self {
            Self {
                connack_code: 0x00,
                suback_code: 0x00,
                publish: None,
            }
        }

        async fn spawn(self) -> MqttConfig {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let port = listener.local_addr().unwrap().port();

            tokio::spawn(async move {
                let (mut stream, _) = listener.accept().await.unwrap();

                let (header, _) = read_packet(&mut stream).await;
                assert_eq!(header, 0x10, "expected CONNECT");
                stream
                    .write_all(&[0x20, 0x02, 0x00, self.connack_code])
                    .await
                    .unwrap();
                if self.connack_code != 0x00 {
                    return;
                }

                let (header, body) = read_packet(&mut stream).await;
                assert_eq!(header, 0x82, "expected SUBSCRIBE");
                stream
                    .write_all(&[0x90, 0x03, body[0], body[1], self.suback_code])
                    .await
                    .unwrap();

                if let Some(publish) = self.publish {
                    stream.write_all(&publish).await.unwrap();
                }

                // 保持连接直到客户端断开
                let mut rest = [0u8; 64];
                while matches!(stream.read(&mut rest).await, Ok(n) if n > 0) {}
            });

            let mut config = Config::default().mqtt;
            config.server = "127.0.0.1".to_string();
            config.port = port.to_string();
            config
        }
    }

    #[test]
    fn test_mqtt_options_rejects_bad_port() {
        let mut config = Config::default().mqtt;
        config.port = "eighteen".to_string();
        assert!(matches!(
            mqtt_options(&config),
            Err(BrokerError::InvalidPort(p)) if p == "eighteen"
        ));
    }

    #[test]
    fn test_mqtt_options_uses_server_and_port() {
        let mut config = Config::default().mqtt;
        config.server = "broker.local".to_string();
        config.port = "1884".to_string();

        let options = mqtt_options(&config).unwrap();
        assert_eq!(options.broker_address(), ("broker.local".to_string(), 1884));
        assert!(options.client_id().starts_with("mqtt-desktop-notify-"));
        assert_eq!(options.credentials(), None);
    }

    #[test]
    fn test_mqtt_options_needs_both_credentials() {
        let mut config = Config::default().mqtt;
        config.username = Some("alice".to_string());
        assert_eq!(mqtt_options(&config).unwrap().credentials(), None);

        config.password = Some("secret".to_string());
        assert_eq!(
            mqtt_options(&config).unwrap().credentials(),
            Some(("alice".to_string(), "secret".to_string()))
        );
    }

    #[tokio::test]
    async fn test_connect_fails_fast_on_bad_port() {
        let mut config = Config::default().mqtt;
        config.port = "99999".to_string();
        let err = MqttSession::connect(&config).await.err().unwrap();
        assert!(matches!(err, BrokerError::InvalidPort(_)));
    }

    #[test]
    fn test_mqtt_options_accepts_large_packets() {
        let options = mqtt_options(&Config::default().mqtt).unwrap();
        assert_eq!(options.max_packet_size(), MAX_PACKET_SIZE);
    }

    #[tokio::test]
    async fn test_large_payload_is_delivered() {
        // Given: 代理在订阅后推送一条 20 KiB 的消息
        let payload = vec![b'x'; 20 * 1024];
        let config = FakeBroker {
            publish: Some(publish_packet("mqtt-desktop-notify/default", &payload)),
            ..FakeBroker::accepting()
        }
        .spawn()
        .await;

        // When
        let mut session = MqttSession::connect(&config).await.unwrap();
        session.subscribe(&config.topic).await.unwrap();
        let received = session.next_payload().await.unwrap();

        // Then: 整条消息送达，会话仍然可用
        assert_eq!(received.map(|p| p.len()), Some(payload.len()));
        session.disconnect(Duration::from_millis(50)).await;
    }

    #[tokio::test]
    async fn test_connect_to_closed_port_is_connect_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let mut config = Config::default().mqtt;
        config.server = "127.0.0.1".to_string();
        config.port = port.to_string();

        let err = MqttSession::connect(&config).await.err().unwrap();
        assert!(matches!(err, BrokerError::Connect { .. }), "got {err:?}");
        assert!(err.to_string().contains(&format!("tcp://127.0.0.1:{port}")));
    }

    #[tokio::test]
    async fn test_connack_failure_code_is_refused() {
        // Given: 代理以 "not authorized" 拒绝连接
        let config = FakeBroker {
            connack_code: 0x05,
            ..FakeBroker::accepting()
        }
        .spawn()
        .await;

        // When
        let err = MqttSession::connect(&config).await.err().unwrap();

        // Then
        assert!(matches!(err, BrokerError::Refused { .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn test_suback_failure_is_subscribe_rejected() {
        // Given: 代理接受连接但拒绝订阅
        let config = FakeBroker {
            suback_code: 0x80,
            ..FakeBroker::accepting()
        }
        .spawn()
        .await;

        // When
        let mut session = MqttSession::connect(&config).await.unwrap();
        let err = session.subscribe(&config.topic).await.unwrap_err();

        // Then
        assert!(
            matches!(err, BrokerError::SubscribeRejected { ref topic } if topic == "mqtt-desktop-notify/default"),
            "got {err:?}"
        );
    }
}
