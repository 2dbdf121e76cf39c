use cpal::traits::{DeviceTrait, HostTrait};
use cpal::{Device, Host};
use shotwatch_foundation::AudioError;

pub struct DeviceManager {
    host: Host,
    current_device: Option<Device>,
}

#[derive(Debug, Clone)]
pub struct DeviceInfo {
    pub name: String,
    pub is_default: bool,
}

impl DeviceManager {
    pub fn new() -> Result<Self, AudioError> {
        let host = cpal::default_host();
        Ok(Self {
            host,
            current_device: None,
        })
    }

    pub fn host_id(&self) -> cpal::HostId {
        self.host.id()
    }

    pub fn enumerate_devices(&self) -> Vec<DeviceInfo> {
        let default_name = self
            .host
            .default_input_device()
            .and_then(|d| d.name().ok());

        let mut devices = Vec::new();
        if let Ok(inputs) = self.host.input_devices() {
            for device in inputs {
                if let Ok(name) = device.name() {
                    let is_default = default_name.as_deref() == Some(name.as_str());
                    devices.push(DeviceInfo { name, is_default });
                }
            }
        }
        devices
    }

    /// Device names to try when opening or recovering a stream, default
    /// input first.
    pub fn candidate_device_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        for info in self.enumerate_devices() {
            if info.is_default {
                names.insert(0, info.name);
            } else {
                names.push(info.name);
            }
        }
        names
    }

    /// Open the named device, or the host default when no name is given.
    pub fn open_device(&mut self, name: Option<&str>) -> Result<Device, AudioError> {
        let device = match name {
            Some(wanted) => {
                let mut found = None;
                if let Ok(inputs) = self.host.input_devices() {
                    for device in inputs {
                        if device.name().as_deref() == Ok(wanted) {
                            found = Some(device);
                            break;
                        }
                    }
                }
                found.ok_or(AudioError::DeviceNotFound {
                    name: Some(wanted.to_string()),
                })?
            }
            None => self
                .host
                .default_input_device()
                .ok_or(AudioError::DeviceNotFound { name: None })?,
        };

        if let Ok(n) = device.name() {
            tracing::debug!("Opened input device: {}", n);
        }
        self.current_device = Some(device.clone());
        Ok(device)
    }

    pub fn current_device_name(&self) -> Option<String> {
        self.current_device.as_ref().and_then(|d| d.name().ok())
    }
}
