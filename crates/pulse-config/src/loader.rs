use anyhow::{anyhow, Result};
use config::{Config, File, FileFormat};
use std::path::{Path, PathBuf};

use crate::HealthcheckConfig;

/// 配置加载器
pub struct ConfigLoader {
    config_path: PathBuf,
}

impl ConfigLoader {
    /// 创建配置加载器
    pub fn new<P: AsRef<Path>>(config_path: P) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
        }
    }

    /// 加载健康检查配置
    pub fn load(&self) -> Result<HealthcheckConfig> {
        if !self.config_path.exists() {
            // 如果配置文件不存在，返回默认配置（所有目标默认禁用）
            return Ok(HealthcheckConfig::default());
        }

        let config = Config::builder()
            .add_source(File::new(
                self.config_path
                    .to_str()
                    .ok_or_else(|| anyhow!("Invalid config path"))?,
                FileFormat::Toml,
            ))
            .build()?;

        Ok(config.try_deserialize()?)
    }
}
