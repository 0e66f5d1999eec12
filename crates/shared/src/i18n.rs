//! Localized user-facing text. Behavior never depends on the active locale;
//! only the rendered strings change.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Locale {
    #[default]
    Zh,
    En,
}

impl Locale {
    pub const ALL: [Locale; 2] = [Locale::Zh, Locale::En];

    pub fn code(self) -> &'static str {
        match self {
            Self::Zh => "zh",
            Self::En => "en",
        }
    }

    pub fn native_name(self) -> &'static str {
        match self {
            Self::Zh => "中文",
            Self::En => "English",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "zh" | "zh-cn" | "cn" => Ok(Self::Zh),
            "en" | "en-us" | "en-gb" => Ok(Self::En),
            other => Err(format!("unsupported locale '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKey {
    AppTitle,
    WaitingForUpload,
    FileSelected,
    Processing,
    ProcessingComplete,
    ProcessingFailed,
    ProcessingErrorPrefix,
    RequestFailedPrefix,
    StreamEndedEarly,
    UnsupportedFileType,
    DropHint,
    RemoveFile,
    StartProcessing,
    ResetAll,
    DownloadResult,
    ResultPlaceholder,
    SectionUpload,
    SectionStyle,
    SectionAcademic,
    BeautifyToggle,
    AcademicToggle,
    CustomToggle,
    PaperFormatLabel,
    LayoutLabel,
    VectorFormatLabel,
    VectorFormatNone,
    DpiLabel,
    FontSizeLabel,
    TitleSizeLabel,
    FigWidthLabel,
    FigHeightLabel,
    CustomDpiLabel,
    UserGuide,
    UserGuideBody,
    Close,
    Language,
    LayoutSingle,
    LayoutDouble,
    SaveResult,
    Settings,
    ServerUrlLabel,
    DownloadDirLabel,
    Apply,
}

pub fn text(locale: Locale, key: MessageKey) -> &'static str {
    match locale {
        Locale::Zh => zh(key),
        Locale::En => en(key),
    }
}

fn zh(key: MessageKey) -> &'static str {
    use MessageKey::*;
    match key {
        AppTitle => "AcademicPlot Pro",
        WaitingForUpload => "等待文件上传",
        FileSelected => "文件已选择，准备处理",
        Processing => "正在处理文件...",
        ProcessingComplete => "处理完成！",
        ProcessingFailed => "处理失败",
        ProcessingErrorPrefix => "处理错误: ",
        RequestFailedPrefix => "请求发送失败: ",
        StreamEndedEarly => "服务器在返回结果前结束了响应",
        UnsupportedFileType => "请选择Python文件 (.py)",
        DropHint => "拖放 .py 文件到此处，或点击选择 (Ctrl+U)",
        RemoveFile => "移除文件",
        StartProcessing => "开始处理 (Ctrl+Enter)",
        ResetAll => "全部重置",
        DownloadResult => "下载结果",
        ResultPlaceholder => "处理结果将显示在这里",
        SectionUpload => "文件上传",
        SectionStyle => "样式选项",
        SectionAcademic => "学术出版设置",
        BeautifyToggle => "美化图表",
        AcademicToggle => "学术模式",
        CustomToggle => "自定义参数",
        PaperFormatLabel => "期刊格式",
        LayoutLabel => "版式",
        VectorFormatLabel => "矢量格式",
        VectorFormatNone => "不导出",
        DpiLabel => "分辨率",
        FontSizeLabel => "字号",
        TitleSizeLabel => "标题字号",
        FigWidthLabel => "图宽 (英寸)",
        FigHeightLabel => "图高 (英寸)",
        CustomDpiLabel => "自定义分辨率",
        UserGuide => "使用指南",
        UserGuideBody => "1. 选择或拖入一个 Python 绘图脚本 (.py)。\n2. 按需开启美化或学术模式，学术模式下可进一步自定义参数。\n3. 点击开始处理，状态栏会实时显示进度。\n4. 处理完成后点击下载结果。",
        Close => "关闭",
        Language => "语言",
        LayoutSingle => "单栏",
        LayoutDouble => "双栏",
        SaveResult => "保存到本地",
        Settings => "设置",
        ServerUrlLabel => "服务器地址",
        DownloadDirLabel => "下载目录",
        Apply => "应用",
    }
}

fn en(key: MessageKey) -> &'static str {
    use MessageKey::*;
    match key {
        AppTitle => "AcademicPlot Pro",
        WaitingForUpload => "Waiting for a file",
        FileSelected => "File selected, ready to process",
        Processing => "Processing file...",
        ProcessingComplete => "Processing complete!",
        ProcessingFailed => "Processing failed",
        ProcessingErrorPrefix => "Processing error: ",
        RequestFailedPrefix => "Request failed: ",
        StreamEndedEarly => "The server closed the response before sending a result",
        UnsupportedFileType => "Please choose a Python file (.py)",
        DropHint => "Drop a .py file here or click to browse (Ctrl+U)",
        RemoveFile => "Remove file",
        StartProcessing => "Start processing (Ctrl+Enter)",
        ResetAll => "Reset all",
        DownloadResult => "Download result",
        ResultPlaceholder => "Results will appear here",
        SectionUpload => "Upload",
        SectionStyle => "Style options",
        SectionAcademic => "Academic publishing",
        BeautifyToggle => "Beautify chart",
        AcademicToggle => "Academic mode",
        CustomToggle => "Custom parameters",
        PaperFormatLabel => "Paper format",
        LayoutLabel => "Layout",
        VectorFormatLabel => "Vector format",
        VectorFormatNone => "None",
        DpiLabel => "Resolution",
        FontSizeLabel => "Font size",
        TitleSizeLabel => "Title size",
        FigWidthLabel => "Figure width (in)",
        FigHeightLabel => "Figure height (in)",
        CustomDpiLabel => "Custom resolution",
        UserGuide => "User guide",
        UserGuideBody => "1. Choose or drop a Python plotting script (.py).\n2. Enable beautify or academic mode as needed; academic mode unlocks custom parameters.\n3. Start processing and watch the status line for progress.\n4. Download the result when processing completes.",
        Close => "Close",
        Language => "Language",
        LayoutSingle => "Single column",
        LayoutDouble => "Double column",
        SaveResult => "Save to disk",
        Settings => "Settings",
        ServerUrlLabel => "Server URL",
        DownloadDirLabel => "Download folder",
        Apply => "Apply",
    }
}
