//! # 图片转换客户端：命令行入口
//!
//! 本文件仅负责日志初始化、参数解析与子命令分发。
//! 业务逻辑分布在各子模块中，详见 `lib.rs` 架构文档。

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use image_converter::convert::{
    CompressionPreset, ConversionClient, ConversionRequest, ConvertConfig, OutputFormat, UploadFile,
};
use image_converter::error::AppError;
use image_converter::preview::{
    self, FilterParameters, ImageSource, PreviewConfig, PreviewError, PreviewHandler,
    PreviewPerformanceProfile, PreviewSession, Rotation,
};
use image_converter::settings::{self, AppSettings};

#[derive(Parser, Debug)]
#[command(name = "image-converter")]
#[command(version, about, long_about = None)]
struct Cli {
    /// 设置文件（JSON），不存在时使用默认配置
    #[arg(short, long, global = true, default_value = "image-converter.json")]
    settings: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 本地渲染滤镜预览并导出 PNG
    Preview(PreviewArgs),
    /// 调用远程 API 转换图片
    Convert(ConvertArgs),
}

#[derive(Args, Debug)]
struct PreviewArgs {
    /// 输入图片
    input: PathBuf,

    /// 输出 PNG 路径，默认 `<输入名>-filtered.png`
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// 滤镜参数文件（JSON，UI 字段名）；命令行开关会覆盖其中的值
    #[arg(long)]
    params: Option<PathBuf>,

    /// 性能档位：quality / balanced / speed。默认 quality，按原图分辨率导出
    #[arg(long)]
    profile: Option<PreviewPerformanceProfile>,

    /// 开关类参数：`--grayscale` 开启，`--grayscale=false` 关闭参数文件中的设置
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    grayscale: Option<bool>,
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    sepia: Option<bool>,
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    negative: Option<bool>,
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    sharpen: Option<bool>,
    #[arg(long)]
    brightness: Option<f64>,
    #[arg(long)]
    contrast: Option<f64>,
    #[arg(long)]
    saturation: Option<f64>,
    /// 模糊半径（像素，可为小数）
    #[arg(long)]
    blur: Option<f64>,
    /// 叠加色 `#rrggbb`
    #[arg(long)]
    tint: Option<String>,
    /// 顺时针旋转角度（90 的整数倍）
    #[arg(long, allow_hyphen_values = true)]
    rotation: Option<i32>,
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    flip_horizontal: Option<bool>,
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    flip_vertical: Option<bool>,
}

#[derive(Args, Debug)]
struct ConvertArgs {
    /// 待转换图片（可多张，多张时返回 zip）
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// 输出格式：jpeg / png / webp / tiff / gif / avif / bmp / heif
    #[arg(short, long, default_value = "png")]
    format: OutputFormat,

    /// 质量 1~100
    #[arg(short, long)]
    quality: Option<u8>,

    /// 压缩预设：web / print / maximum / balanced / custom
    #[arg(long)]
    preset: Option<CompressionPreset>,

    #[arg(long)]
    width: Option<u32>,
    #[arg(long)]
    height: Option<u32>,

    /// 远程 API 根地址，覆盖设置文件与环境变量
    #[arg(long)]
    api_base_url: Option<String>,

    /// 结果保存目录
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

impl PreviewArgs {
    fn filter_parameters(&self) -> Result<FilterParameters, AppError> {
        let mut params = match &self.params {
            Some(path) => settings::load_filter_parameters(path)?,
            None => FilterParameters::default(),
        };

        let switches = [
            (&mut params.grayscale, self.grayscale),
            (&mut params.sepia, self.sepia),
            (&mut params.negative, self.negative),
            (&mut params.sharpen, self.sharpen),
            (&mut params.flip_horizontal, self.flip_horizontal),
            (&mut params.flip_vertical, self.flip_vertical),
        ];
        for (field, value) in switches {
            if let Some(value) = value {
                *field = value;
            }
        }
        if let Some(value) = self.brightness {
            params.brightness = value;
        }
        if let Some(value) = self.contrast {
            params.contrast = value;
        }
        if let Some(value) = self.saturation {
            params.saturation = value;
        }
        if let Some(value) = self.blur {
            params.blur = value;
        }
        if let Some(value) = &self.tint {
            params.tint = value.clone();
        }
        if let Some(degrees) = self.rotation {
            params.rotation = Rotation::try_from(degrees)?;
        }

        Ok(params)
    }
}

/// 导出用的处理器。未指定档位时按 quality 档位解码，保证导出图与原图同分辨率。
fn export_handler(
    config: PreviewConfig,
    profile: Option<PreviewPerformanceProfile>,
) -> Result<PreviewHandler, PreviewError> {
    let handler = PreviewHandler::new(config)?;
    let profile = profile.unwrap_or(PreviewPerformanceProfile::Quality);
    handler.set_performance_profile(profile)?;

    if handler.config_snapshot()?.adaptive_resize {
        log::warn!(
            "⚠️ 性能档位 {} 会对大图降采样，导出的 PNG 可能小于原图",
            profile.as_str()
        );
    }
    Ok(handler)
}

fn run_preview(args: PreviewArgs, app_settings: AppSettings) -> Result<(), AppError> {
    let handler = export_handler(app_settings.preview, args.profile)?;

    let params = args.filter_parameters()?;
    let input = args.input.to_string_lossy().to_string();
    let source = handler.load_source(ImageSource::FilePath(input))?;

    let mut session = PreviewSession::new();
    session.set_source(source);
    session.set_params(params);

    let frame = match session.render_latest() {
        Some(frame) => frame,
        None => return Ok(()),
    };

    let output = args.output.unwrap_or_else(|| default_preview_output(&args.input));
    preview::write_png(&frame.image, &output)?;
    println!("{}", output.display());
    Ok(())
}

fn default_preview_output(input: &Path) -> PathBuf {
    let name = input
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| "image".to_string());
    input.with_file_name(preview::filtered_file_name(&name))
}

async fn run_convert(args: ConvertArgs, app_settings: AppSettings) -> Result<(), AppError> {
    let mut config: ConvertConfig = app_settings.convert;
    if args.api_base_url.is_some() {
        config.api_base_url = args.api_base_url;
    }
    let client = ConversionClient::new(config.with_env_fallback())?;

    let mut request = ConversionRequest::new()
        .with_format(args.format)
        .with_size(args.width, args.height);
    if let Some(preset) = args.preset {
        request = request.with_preset(preset);
    }
    if let Some(quality) = args.quality {
        request = request.with_quality(quality);
    }
    for path in &args.files {
        request.add_file(UploadFile::from_path(path)?);
    }

    let output = client.convert(&request).await?;

    tokio::fs::create_dir_all(&args.out_dir).await?;
    let target = args.out_dir.join(&output.file_name);
    tokio::fs::write(&target, &output.bytes).await?;

    let kind = if output.is_archive() { "Archive" } else { "File" };
    println!("Conversion successful! {} saved to {}", kind, target.display());
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let app_settings = match settings::load_settings(&cli.settings) {
        Ok(Some(loaded)) => {
            log::info!("setup: settings loaded from {}", cli.settings.display());
            loaded
        }
        Ok(None) => AppSettings::default(),
        Err(err) => {
            log::error!("setup: 设置文件读取失败，使用默认配置: {err}");
            AppSettings::default()
        }
    };

    let result = match cli.command {
        Command::Preview(args) => run_preview(args, app_settings),
        Command::Convert(args) => match tokio::runtime::Runtime::new() {
            Ok(runtime) => runtime.block_on(run_convert(args, app_settings)),
            Err(err) => Err(AppError::Io(err)),
        },
    };

    if let Err(err) = result {
        log::error!("❌ [{}] {}", err.code(), err);
        std::process::exit(1);
    }
}
