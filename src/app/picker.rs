//! 搜索选择器
//!
//! 展示层的模型：结果列表、当前高亮项、打开时的原始位置。
//! - 高亮项变化时给出预览目标（不抢焦点）
//! - 确认时给出跳转目标
//! - 未确认就关闭时回到原始位置

use super::controller::SearchController;
use crate::kernel::services::ports::search::Result as SearchResult;
use crate::kernel::services::ports::{NavigationTarget, PickerItem};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerExit {
    Accepted,
    Restore(NavigationTarget),
    Dismissed,
}

pub struct Picker {
    controller: SearchController,
    active: usize,
    origin: Option<NavigationTarget>,
    accepted: bool,
}

impl Picker {
    pub fn open(controller: SearchController, origin: Option<NavigationTarget>) -> Self {
        Self {
            controller,
            active: 0,
            origin,
            accepted: false,
        }
    }

    pub fn controller(&self) -> &SearchController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut SearchController {
        &mut self.controller
    }

    pub fn set_query(&mut self, raw_text: &str) -> SearchResult<()> {
        self.active = 0;
        self.controller.set_query(raw_text)
    }

    pub fn items(&self) -> Vec<PickerItem> {
        self.controller.results().iter().map(|r| r.view()).collect()
    }

    pub fn active_index(&self) -> Option<usize> {
        let len = self.controller.results().len();
        (len > 0).then(|| self.active.min(len - 1))
    }

    /// 移动高亮项，返回新高亮项的预览目标
    pub fn move_active(&mut self, delta: isize) -> Option<NavigationTarget> {
        let current = self.active_index()?;
        let last = self.controller.results().len() - 1;
        self.active = current.saturating_add_signed(delta).min(last);
        self.preview()
    }

    pub fn preview(&self) -> Option<NavigationTarget> {
        let index = self.active_index()?;
        self.controller
            .results()
            .get(index)
            .map(|r| r.navigation_target(true))
    }

    pub fn accept(&mut self) -> Option<NavigationTarget> {
        let index = self.active_index()?;
        let target = self.controller.results().get(index)?.navigation_target(false);
        self.accepted = true;
        self.controller.cancel();
        Some(target)
    }

    pub fn hide(mut self) -> PickerExit {
        self.controller.cancel();
        if self.accepted {
            return PickerExit::Accepted;
        }
        match self.origin.take() {
            Some(origin) => PickerExit::Restore(origin),
            None => PickerExit::Dismissed,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/app/picker.rs"]
mod tests;
